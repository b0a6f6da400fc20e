use crate::{Email, MailerError};
use askama::Template;

#[derive(Template)]
#[template(
    source = r#"Your {{ app_name }} sign-in code is {{ code }}

Enter it on the sign-in page, or open this link:
{{ magic_link }}

The code expires in a few minutes and can only be used once. If you did not request it, you can ignore this email.
"#,
    ext = "txt"
)]
struct MagicCodeText<'a> {
    app_name: &'a str,
    code: &'a str,
    magic_link: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{ app_name }} sign-in code</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <p>Your {{ app_name }} sign-in code is</p>
    <p style="font-size: 24px; font-family: monospace; letter-spacing: 2px;"><strong>{{ code }}</strong></p>
    <p><a href="{{ magic_link }}">Sign in to {{ app_name }}</a></p>
    <p>The code expires in a few minutes and can only be used once. If you did not request it, you can ignore this email.</p>
</body>
</html>
"#,
    ext = "html"
)]
struct MagicCodeHtml<'a> {
    app_name: &'a str,
    code: &'a str,
    magic_link: &'a str,
}

/// The one-time code email.
pub struct MagicCodeEmail;

impl MagicCodeEmail {
    pub fn build(
        from: &str,
        to: &str,
        code: &str,
        magic_link: &str,
        app_name: &str,
    ) -> Result<Email, MailerError> {
        let text_body = MagicCodeText {
            app_name,
            code,
            magic_link,
        }
        .render()?;
        let html_body = MagicCodeHtml {
            app_name,
            code,
            magic_link,
        }
        .render()?;

        Email::builder()
            .from(from)
            .to(to)
            .subject(format!("{code} is your {app_name} sign-in code"))
            .text_body(text_body)
            .html_body(html_body)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(app_name: &str) -> Email {
        MagicCodeEmail::build(
            "noreply@sesame.test",
            "ada@example.com",
            "abcd-efgh-ijkl",
            "https://sesame.test/spaces/magic?key=mgc_123&code=abcd-efgh-ijkl",
            app_name,
        )
        .unwrap()
    }

    #[test]
    fn test_magic_code_email() {
        let email = build("Sesame");

        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "abcd-efgh-ijkl is your Sesame sign-in code");

        assert!(email.text_body.contains("abcd-efgh-ijkl"));
        assert!(
            email
                .text_body
                .contains("https://sesame.test/spaces/magic?key=mgc_123&code=abcd-efgh-ijkl")
        );

        let html = email.html_body.unwrap();
        assert!(html.contains("<strong>abcd-efgh-ijkl</strong>"));
        assert!(html.contains("key=mgc_123&amp;code=abcd-efgh-ijkl"));
    }

    #[test]
    fn test_html_body_is_escaped() {
        let email = build("<b>Acme</b>");

        let html = email.html_body.unwrap();
        assert!(html.contains("&lt;b&gt;Acme&lt;"));
        assert!(!html.contains("<b>Acme"));

        assert!(email.text_body.contains("Your <b>Acme</b> sign-in code"));
    }
}
