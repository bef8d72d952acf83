use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::mail::Mailer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    pub fn new(config: Config, auth: AuthService, mailer: Mailer) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            mailer: Arc::new(mailer),
        }
    }
}
