use crate::message::build_message;
use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsType {
    /// Plain text. Only for local relays such as mailpit.
    None,
    #[default]
    StartTls,
    /// Implicit TLS, usually port 465.
    Tls,
}

impl TlsType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "none" => Some(TlsType::None),
            "starttls" => Some(TlsType::StartTls),
            "tls" => Some(TlsType::Tls),
            _ => None,
        }
    }
}

/// Where and how to reach the SMTP relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub tls: TlsType,
}

/// Sends through an SMTP relay. The connection pool is opened lazily on first send.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailerError> {
        let host = settings.host.as_str();
        let mut builder = match settings.tls {
            TlsType::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            TlsType::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            TlsType::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
        };

        if let Some(port) = settings.port {
            builder = builder.port(port);
        }

        // Authentication needs both halves; a lone username is ignored.
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let message = build_message(email)?;
        let response = self.transport.send(message).await?;
        tracing::debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tls_type_parse() {
        assert_eq!(TlsType::parse("STARTTLS"), Some(TlsType::StartTls));
        assert_eq!(TlsType::parse("tls"), Some(TlsType::Tls));
        assert_eq!(TlsType::parse("none"), Some(TlsType::None));
        assert_eq!(TlsType::parse("ssl"), None);
    }

    #[tokio::test]
    async fn test_new_with_credentials() {
        let settings = SmtpSettings {
            host: "smtp.sesame.test".to_string(),
            port: Some(587),
            username: Some("mailer".to_string()),
            password: Some("secret".to_string()),
            tls: TlsType::StartTls,
        };

        assert!(SmtpTransport::new(&settings).is_ok());
    }

    #[tokio::test]
    async fn test_new_plaintext_relay() {
        let settings = SmtpSettings {
            host: "localhost".to_string(),
            port: Some(1025),
            tls: TlsType::None,
            ..SmtpSettings::default()
        };

        assert!(SmtpTransport::new(&settings).is_ok());
    }
}
