use crate::{Email, MailerError};
use lettre::Message;
use lettre::message::{MultiPart, SinglePart};

/// Convert an [`Email`] into a lettre [`Message`].
///
/// With an HTML body the message is `multipart/alternative`, plain text first.
pub(crate) fn build_message(email: Email) -> Result<Message, MailerError> {
    let builder = Message::builder()
        .from(email.from.parse()?)
        .to(email.to.parse()?)
        .subject(email.subject);

    let message = match email.html_body {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(
            email.text_body,
            html,
        ))?,
        None => builder.singlepart(SinglePart::plain(email.text_body))?,
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> Email {
        Email {
            to: to.to_string(),
            from: "Sesame <noreply@sesame.test>".to_string(),
            subject: "Your code".to_string(),
            text_body: "abcd-efgh-ijkl".to_string(),
            html_body: Some("<p>abcd-efgh-ijkl</p>".to_string()),
        }
    }

    #[test]
    fn test_build_message() {
        let message = build_message(email("ada@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("abcd-efgh-ijkl"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        assert!(matches!(
            build_message(email("not an address")),
            Err(MailerError::InvalidAddress(_))
        ));
    }
}
