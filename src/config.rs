use std::env;

/// Process-wide relay configuration, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub auth_key: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// STARTTLS on the SMTP connection.
    pub use_tls: bool,
    /// Implicit TLS; takes precedence over `use_tls`.
    pub use_ssl: bool,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_port(
                &env::var("PORT").unwrap_or_else(|_| "8000".to_string()),
                "PORT",
            )?,
            auth_key: required_var("AUTH_KEY")?,
            smtp_host: required_var("SMTP_HOST")?,
            smtp_port: parse_port(
                &env::var("SMTP_PORT").unwrap_or_else(|_| "587".to_string()),
                "SMTP_PORT",
            )?,
            smtp_username: optional_var("SMTP_USERNAME"),
            smtp_password: optional_var("SMTP_PASSWORD"),
            use_tls: env_bool("SMTP_USE_TLS", true),
            use_ssl: env_bool("SMTP_USE_SSL", false),
            from_email: optional_var("SMTP_FROM_EMAIL"),
            from_name: optional_var("SMTP_FROM_NAME"),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => parse_bool(&value),
        Err(_) => default,
    }
}

/// Truthy values are `1`, `true`, `yes`, `on` (case-insensitive); anything
/// else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_port(value: &str, name: &'static str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidPort(name))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid port value in {0}")]
    InvalidPort(&'static str),
}
