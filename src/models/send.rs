use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Inbound `/send` request body. All fields optional at the serde level so
/// that missing fields surface as validation errors, not parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendRequest {
    pub to: Option<Recipients>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

/// One address or an ordered list of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn is_empty(&self) -> bool {
        match self {
            Recipients::One(addr) => addr.is_empty(),
            Recipients::Many(addrs) => addrs.is_empty(),
        }
    }

    /// Addresses in request order.
    pub fn addresses(&self) -> Vec<&str> {
        match self {
            Recipients::One(addr) => vec![addr.as_str()],
            Recipients::Many(addrs) => addrs.iter().map(String::as_str).collect(),
        }
    }

    /// Rendered `To` header value: addresses joined with `", "`.
    pub fn join(&self) -> String {
        self.addresses().join(", ")
    }
}

/// Body of a validated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailBody {
    Text(String),
    Html(String),
    Both { text: String, html: String },
}

/// A request that passed field validation.
#[derive(Debug, Clone)]
pub struct ValidatedSend {
    pub to: Recipients,
    pub subject: String,
    pub body: MailBody,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

impl SendRequest {
    /// Check required fields: `to`, `subject` and at least one of
    /// `text`/`html`, all non-empty.
    pub fn validate(self) -> Result<ValidatedSend, AppError> {
        let to = self.to.filter(|t| !t.is_empty());
        let subject = self.subject.filter(|s| !s.is_empty());
        let text = self.text.filter(|t| !t.is_empty());
        let html = self.html.filter(|h| !h.is_empty());

        let body = match (text, html) {
            (Some(text), Some(html)) => Some(MailBody::Both { text, html }),
            (Some(text), None) => Some(MailBody::Text(text)),
            (None, Some(html)) => Some(MailBody::Html(html)),
            (None, None) => None,
        };

        match (to, subject, body) {
            (Some(to), Some(subject), Some(body)) => Ok(ValidatedSend {
                to,
                subject,
                body,
                from_email: self.from_email.filter(|v| !v.is_empty()),
                from_name: self.from_name.filter(|v| !v.is_empty()),
            }),
            _ => Err(AppError::BadRequest(
                "Fields 'to', 'subject' and at least one of 'text' or 'html' are required"
                    .to_string(),
            )),
        }
    }
}

/// Resolve the sender identity for a validated request.
///
/// Address precedence: request `from_email`, then `SMTP_FROM_EMAIL`, then
/// `SMTP_USERNAME`. Display name precedence: request `from_name`, then
/// `SMTP_FROM_NAME`.
pub fn resolve_sender(
    send: &ValidatedSend,
    config: &Config,
) -> Result<(String, Option<String>), AppError> {
    let from_email = send
        .from_email
        .clone()
        .or_else(|| config.from_email.clone())
        .or_else(|| config.smtp_username.clone());

    let from_email = match from_email {
        Some(addr) if !addr.is_empty() => addr,
        _ => {
            return Err(AppError::BadRequest(
                "No from_email provided and no default configured".to_string(),
            ))
        }
    };

    let from_name = send.from_name.clone().or_else(|| config.from_name.clone());

    Ok((from_email, from_name))
}

/// Normalized delivery result returned to the caller.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub status: String,
    pub code: Option<u16>,
    pub message: Option<String>,
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_config() -> Config {
        Config {
            server_host: "localhost".to_string(),
            server_port: 8000,
            auth_key: "secret123".to_string(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            use_tls: true,
            use_ssl: false,
            from_email: None,
            from_name: None,
        }
    }

    fn valid_request() -> SendRequest {
        SendRequest {
            to: Some(Recipients::One("a@example.com".to_string())),
            subject: Some("Hi".to_string()),
            text: Some("hello".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_single_recipient() {
        let request: SendRequest =
            serde_json::from_str(r#"{"to":"a@example.com","subject":"Hi","text":"hello"}"#)
                .unwrap();
        assert_eq!(
            request.to,
            Some(Recipients::One("a@example.com".to_string()))
        );
    }

    #[test]
    fn test_deserialize_recipient_list() {
        let request: SendRequest =
            serde_json::from_str(r#"{"to":["a@example.com","b@example.com"],"subject":"Hi"}"#)
                .unwrap();
        assert_eq!(
            request.to,
            Some(Recipients::Many(vec![
                "a@example.com".to_string(),
                "b@example.com".to_string()
            ]))
        );
    }

    #[test]
    fn test_join_preserves_order() {
        let recipients = Recipients::Many(vec![
            "c@example.com".to_string(),
            "a@example.com".to_string(),
            "b@example.com".to_string(),
        ]);
        assert_eq!(recipients.join(), "c@example.com, a@example.com, b@example.com");
    }

    #[test]
    fn test_validate_missing_to() {
        let request = SendRequest {
            to: None,
            ..valid_request()
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("'to', 'subject'"));
    }

    #[test]
    fn test_validate_empty_recipient_list() {
        let request = SendRequest {
            to: Some(Recipients::Many(vec![])),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_missing_subject() {
        let request = SendRequest {
            subject: Some(String::new()),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_missing_body() {
        let request = SendRequest {
            text: None,
            html: None,
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_body_cases() {
        let text_only = valid_request().validate().unwrap();
        assert_eq!(text_only.body, MailBody::Text("hello".to_string()));

        let html_only = SendRequest {
            text: None,
            html: Some("<b>hello</b>".to_string()),
            ..valid_request()
        }
        .validate()
        .unwrap();
        assert_eq!(html_only.body, MailBody::Html("<b>hello</b>".to_string()));

        let both = SendRequest {
            html: Some("<b>hello</b>".to_string()),
            ..valid_request()
        }
        .validate()
        .unwrap();
        assert_eq!(
            both.body,
            MailBody::Both {
                text: "hello".to_string(),
                html: "<b>hello</b>".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_sender_prefers_request_value() {
        let mut config = test_config();
        config.from_email = Some("default@example.com".to_string());
        let send = SendRequest {
            from_email: Some("me@example.com".to_string()),
            ..valid_request()
        }
        .validate()
        .unwrap();

        let (email, _) = resolve_sender(&send, &config).unwrap();
        assert_eq!(email, "me@example.com");
    }

    #[test]
    fn test_resolve_sender_falls_back_to_configured_default() {
        let mut config = test_config();
        config.from_email = Some("default@example.com".to_string());
        config.smtp_username = Some("user@example.com".to_string());
        let send = valid_request().validate().unwrap();

        let (email, _) = resolve_sender(&send, &config).unwrap();
        assert_eq!(email, "default@example.com");
    }

    #[test]
    fn test_resolve_sender_falls_back_to_username() {
        let mut config = test_config();
        config.smtp_username = Some("user@example.com".to_string());
        let send = valid_request().validate().unwrap();

        let (email, _) = resolve_sender(&send, &config).unwrap();
        assert_eq!(email, "user@example.com");
    }

    #[test]
    fn test_resolve_sender_unresolved() {
        let send = valid_request().validate().unwrap();
        let err = resolve_sender(&send, &test_config()).unwrap_err();
        assert!(err.to_string().contains("No from_email provided"));
    }

    #[test]
    fn test_resolve_sender_name_precedence() {
        let mut config = test_config();
        config.from_name = Some("Default Name".to_string());
        config.smtp_username = Some("user@example.com".to_string());

        let send = SendRequest {
            from_name: Some("Request Name".to_string()),
            ..valid_request()
        }
        .validate()
        .unwrap();
        let (_, name) = resolve_sender(&send, &config).unwrap();
        assert_eq!(name.as_deref(), Some("Request Name"));

        let send = valid_request().validate().unwrap();
        let (_, name) = resolve_sender(&send, &config).unwrap();
        assert_eq!(name.as_deref(), Some("Default Name"));
    }

    #[test]
    fn test_send_response_serializes_nulls() {
        let response = SendResponse {
            status: "sent".to_string(),
            code: Some(250),
            message: None,
            message_id: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "sent",
                "code": 250,
                "message": null,
                "messageId": null
            })
        );
    }
}
