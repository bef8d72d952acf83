pub mod smtp;

pub use smtp::{
    compose, normalize_reply, tls_mode, ComposedMail, RelayOutcome, ReplyText, SmtpMailer,
    TlsMode, TransportReply,
};

use lettre::Message;

use crate::config::Config;
use crate::error::Result;

/// Mailer abstraction (currently backed by SMTP via lettre)
#[derive(Clone)]
pub struct Mailer {
    inner: smtp::SmtpMailer,
}

impl Mailer {
    /// Build the mailer for the configured upstream relay.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            inner: smtp::SmtpMailer::new(config)?,
        })
    }

    /// Relay one composed message upstream.
    pub async fn send(&self, message: Message) -> Result<RelayOutcome> {
        self.inner.send(message).await
    }
}
