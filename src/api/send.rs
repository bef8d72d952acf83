use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::{AppError, Result};
use crate::mail::compose;
use crate::models::{resolve_sender, SendRequest, SendResponse};
use crate::state::AppState;

/// Send routes
pub fn send_routes() -> Router<AppState> {
    Router::new().route("/send", post(send_email))
}

/// POST /send - Relay one email through the upstream SMTP server
///
/// Auth and validation run before any network call; transport failures are
/// captured and reported in the error-shaped body, never crashing the
/// process.
async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<SendResponse>> {
    state.auth.authorize(&headers)?;

    let request: SendRequest = serde_json::from_str(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))?;
    let send = request.validate()?;

    let (from_email, from_name) = resolve_sender(&send, &state.config)?;
    let composed = compose(&send, &from_email, from_name.as_deref())?;

    tracing::info!(to = %send.to.join(), subject = %send.subject, "Relaying message");

    let outcome = state.mailer.send(composed.message).await.map_err(|err| {
        tracing::error!(error = %err, "SMTP relay failed");
        err
    })?;

    tracing::info!(code = ?outcome.code, "Message relayed");

    Ok(Json(SendResponse {
        status: "sent".to_string(),
        code: outcome.code,
        message: outcome.message,
        message_id: composed.message_id,
    }))
}
