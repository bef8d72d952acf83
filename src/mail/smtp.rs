//! SMTP transport, message composition and reply normalization.

use std::time::Duration;

use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Response as SmtpResponse;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{MailBody, ValidatedSend};

/// Deadline for the whole send: connect, handshake and transaction.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// A built MIME message plus the Message-ID lettre assigned to it.
#[derive(Debug)]
pub struct ComposedMail {
    pub message: Message,
    pub message_id: Option<String>,
}

/// Build the MIME message for a validated request.
///
/// The `From` header carries a display name only when one resolved;
/// recipients are added in request order, which lettre renders as a single
/// `To` header joined with `", "`. When both text and HTML bodies are
/// present the message is `multipart/alternative` with the plain part first.
pub fn compose(
    send: &ValidatedSend,
    from_email: &str,
    from_name: Option<&str>,
) -> Result<ComposedMail> {
    let from = match from_name {
        Some(name) if !name.is_empty() => Mailbox::new(
            Some(name.to_string()),
            from_email
                .parse::<Address>()
                .map_err(|_| invalid_address(from_email))?,
        ),
        _ => from_email
            .parse::<Mailbox>()
            .map_err(|_| invalid_address(from_email))?,
    };

    let mut builder = Message::builder()
        .from(from)
        .subject(&send.subject)
        .message_id(None);

    for addr in send.to.addresses() {
        let mailbox: Mailbox = addr.parse().map_err(|_| invalid_address(addr))?;
        builder = builder.to(mailbox);
    }

    let message = match &send.body {
        MailBody::Text(text) => builder.body(text.clone()),
        MailBody::Html(html) => builder.singlepart(SinglePart::html(html.clone())),
        MailBody::Both { text, html } => builder.multipart(
            MultiPart::alternative_plain_html(text.clone(), html.clone()),
        ),
    }
    .map_err(|e| AppError::BadRequest(format!("Failed to build message: {}", e)))?;

    // lettre assigns a Message-ID at build time; read it back so the caller
    // can report it. Absence is reported as null, never an error.
    let message_id = message
        .headers()
        .get_raw("Message-ID")
        .map(|value| value.to_string());

    Ok(ComposedMail {
        message,
        message_id,
    })
}

fn invalid_address(addr: &str) -> AppError {
    AppError::BadRequest(format!("Invalid email address: {}", addr))
}

/// Upstream reply text, as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyText {
    Text(String),
    Bytes(Vec<u8>),
}

impl ReplyText {
    /// Decode to text, lossily when the bytes are not valid UTF-8.
    pub fn into_string(self) -> String {
        match self {
            ReplyText::Text(text) => text,
            ReplyText::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// The shapes an SMTP client reply can arrive in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportReply {
    /// Bare `(code, text)` pair.
    Pair(u16, ReplyText),
    /// Structured reply with optional fields.
    Structured {
        code: Option<u16>,
        message: Option<ReplyText>,
    },
}

/// Collapse any reply shape into the canonical `(code, message)` pair.
/// Absent fields become `None` rather than an error.
pub fn normalize_reply(reply: TransportReply) -> (Option<u16>, Option<String>) {
    match reply {
        TransportReply::Pair(code, text) => (Some(code), Some(text.into_string())),
        TransportReply::Structured { code, message } => {
            (code, message.map(ReplyText::into_string))
        }
    }
}

fn reply_from_response(response: &SmtpResponse) -> TransportReply {
    let code = response.code().to_string().parse().ok();
    let lines: Vec<&str> = response.message().collect();
    let message = if lines.is_empty() {
        None
    } else {
        Some(ReplyText::Text(lines.join(" ")))
    };

    TransportReply::Structured { code, message }
}

/// Outcome of one relay attempt.
#[derive(Debug)]
pub struct RelayOutcome {
    pub code: Option<u16>,
    pub message: Option<String>,
}

/// How the connection to the upstream relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Implicit TLS from the first byte; STARTTLS is never negotiated.
    Implicit,
    /// Plain connection upgraded via STARTTLS.
    StartTls,
    Plain,
}

/// `use_ssl` wins over `use_tls` when both are set.
pub fn tls_mode(config: &Config) -> TlsMode {
    if config.use_ssl {
        TlsMode::Implicit
    } else if config.use_tls {
        TlsMode::StartTls
    } else {
        TlsMode::Plain
    }
}

/// SMTP relay client. One connection per send, no pooling.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport for the configured connection mode.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = match tls_mode(config) {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| {
                    AppError::InternalError(format!("SMTP transport setup failed: {}", e))
                })?,
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(
                    |e| AppError::InternalError(format!("SMTP transport setup failed: {}", e)),
                )?
            }
            TlsMode::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };

        builder = builder.port(config.smtp_port).timeout(Some(SEND_TIMEOUT));

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    /// Submit one message. Every transport failure comes back as
    /// `AppError::Transport`; when the deadline expires the in-flight send
    /// is dropped along with its connection.
    pub async fn send(&self, message: Message) -> Result<RelayOutcome> {
        let response = tokio::time::timeout(SEND_TIMEOUT, self.transport.send(message))
            .await
            .map_err(|_| {
                AppError::Transport(format!(
                    "SMTP send timed out after {}s",
                    SEND_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let (code, message) = normalize_reply(reply_from_response(&response));

        Ok(RelayOutcome { code, message })
    }
}
