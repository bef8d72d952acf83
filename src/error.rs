use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Transport failures keep the relay's error-shaped body: the
            // send was handled, the upstream exchange failed.
            AppError::Transport(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "error": msg,
                })),
            )
                .into_response(),
            AppError::Unauthorized(msg) => error_response(StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, msg),
            AppError::InternalError(msg) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body = Json(json!({
        "error": message,
        "code": status.as_u16()
    }));

    (status, body).into_response()
}

pub type Result<T> = std::result::Result<T, AppError>;
