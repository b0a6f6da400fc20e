#[cfg(feature = "mailer")]
pub use self::mailer_impl::*;

#[cfg(feature = "mailer")]
mod mailer_impl {
    use crate::{
        Error,
        services::dispatch::{MagicCodeMailer, MagicCodeMessage},
    };
    use async_trait::async_trait;
    use sesame_mailer::prelude::*;

    /// Delivers magic codes by email through a `sesame-mailer` transport.
    pub struct MailerDelivery {
        transport: Box<dyn Mailer>,
        config: MailerConfig,
    }

    impl MailerDelivery {
        pub fn new(config: MailerConfig) -> Result<Self, Error> {
            let transport = config
                .build_transport()
                .map_err(|e| Error::Delivery(e.to_string()))?;

            Ok(Self { transport, config })
        }

        pub fn from_env() -> Result<Self, Error> {
            let config = MailerConfig::from_env().map_err(|e| Error::Delivery(e.to_string()))?;
            Self::new(config)
        }

        pub fn with_transport(transport: Box<dyn Mailer>, config: MailerConfig) -> Self {
            Self { transport, config }
        }
    }

    /// `{origin}/spaces/magic?key={identifier}&code={code}`
    pub fn magic_link(message: &MagicCodeMessage) -> String {
        format!(
            "{}/spaces/magic?key={}&code={}",
            message.origin.trim_end_matches('/'),
            message.identifier,
            message.code
        )
    }

    #[async_trait]
    impl MagicCodeMailer for MailerDelivery {
        async fn send_magic_code(&self, message: &MagicCodeMessage) -> Result<(), Error> {
            let email = MagicCodeEmail::build(
                &self.config.sender(),
                &message.email,
                &message.code,
                &magic_link(message),
                &self.config.app_name,
            )
            .map_err(|e| Error::Delivery(e.to_string()))?;

            self.transport
                .send_email(email)
                .await
                .map_err(|e| Error::Delivery(e.to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct CapturingMailer {
            sent: Arc<Mutex<Vec<Email>>>,
        }

        #[async_trait]
        impl Mailer for CapturingMailer {
            async fn send_email(&self, email: Email) -> Result<(), MailerError> {
                self.sent.lock().unwrap().push(email);
                Ok(())
            }
        }

        fn message() -> MagicCodeMessage {
            MagicCodeMessage {
                email: "ada@example.com".to_string(),
                identifier: "mgc_abc".to_string(),
                code: "abcd-efgh-ijkl".to_string(),
                origin: "https://sesame.test/".to_string(),
            }
        }

        #[test]
        fn test_magic_link() {
            assert_eq!(
                magic_link(&message()),
                "https://sesame.test/spaces/magic?key=mgc_abc&code=abcd-efgh-ijkl"
            );
        }

        #[tokio::test]
        async fn test_send_magic_code() {
            let mailer = CapturingMailer::default();
            let delivery =
                MailerDelivery::with_transport(Box::new(mailer.clone()), MailerConfig::default());

            delivery.send_magic_code(&message()).await.unwrap();

            let sent = mailer.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].to, "ada@example.com");
            assert!(sent[0].text_body.contains("abcd-efgh-ijkl"));
        }
    }
}
