use crate::MailerError;
use serde::{Deserialize, Serialize};

/// One outgoing message to a single recipient.
///
/// The plain text body is always present; the HTML body is an optional
/// alternative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct EmailBuilder {
    to: Option<String>,
    from: Option<String>,
    subject: Option<String>,
    text_body: Option<String>,
    html_body: Option<String>,
}

impl EmailBuilder {
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to = Some(address.into());
        self
    }

    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text_body = Some(text.into());
        self
    }

    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn build(self) -> Result<Email, MailerError> {
        Ok(Email {
            to: required(self.to, "recipient")?,
            from: required(self.from, "sender")?,
            subject: required(self.subject, "subject")?,
            text_body: required(self.text_body, "text body")?,
            html_body: self.html_body,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, MailerError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(MailerError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_builder() {
        let email = Email::builder()
            .from("noreply@sesame.test")
            .to("ada@example.com")
            .subject("Your code")
            .text_body("abcd-efgh-ijkl")
            .build()
            .unwrap();

        assert_eq!(email.from, "noreply@sesame.test");
        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.text_body, "abcd-efgh-ijkl");
        assert!(email.html_body.is_none());
    }

    #[test]
    fn test_email_requires_recipient_and_body() {
        let no_recipient = Email::builder()
            .from("noreply@sesame.test")
            .subject("Your code")
            .text_body("body")
            .build();
        assert!(matches!(no_recipient, Err(MailerError::MissingField("recipient"))));

        let blank_body = Email::builder()
            .from("noreply@sesame.test")
            .to("ada@example.com")
            .subject("Your code")
            .text_body("  ")
            .build();
        assert!(matches!(blank_body, Err(MailerError::MissingField("text body"))));
    }
}
