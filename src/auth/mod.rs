use axum::http::HeaderMap;

use crate::config::Config;
use crate::error::{AppError, Result};

/// Shared-key authentication service.
///
/// Callers supply the relay key either in a custom `X-Auth-Key` header or as
/// a standard `Authorization: Bearer <key>` header.
#[derive(Clone)]
pub struct AuthService {
    auth_key: String,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            auth_key: config.auth_key.clone(),
        }
    }

    /// Compare the caller-supplied key against the configured secret.
    ///
    /// The rejection message never reveals whether the key was missing or
    /// merely wrong.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        match extract_key(headers) {
            Some(key) if key == self.auth_key => Ok(()),
            _ => Err(AppError::Unauthorized(
                "Invalid or missing auth key".to_string(),
            )),
        }
    }
}

/// Extract the relay key from the inbound headers.
///
/// `X-Auth-Key` wins when present; otherwise the `Authorization` header is
/// consulted, with the `Bearer` scheme matched case-insensitively and the
/// remainder trimmed.
fn extract_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-auth-key").and_then(|v| v.to_str().ok()) {
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    let auth_header = headers.get("authorization")?.to_str().ok()?;
    let (scheme, rest) = auth_header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim().to_string())
    } else {
        None
    }
}
