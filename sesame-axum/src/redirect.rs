//! Redirect targets for the form endpoints.
use sesame::SesameError;

use crate::types::RedirectConfig;

pub(crate) const HOME_PATH: &str = "spaces";
pub(crate) const SIGN_IN_PATH: &str = "spaces/accounts/sign-in";
pub(crate) const SET_PASSWORD_PATH: &str = "spaces/accounts/set-password";

impl RedirectConfig {
    /// `path` joined onto the base URL with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        format!("{base}/{path}")
    }

    /// The post-sign-in destination: `next_path` when it stays on this site,
    /// otherwise the home page.
    pub fn next_url(&self, next_path: Option<&str>) -> String {
        match next_path.filter(|path| is_local_path(path)) {
            Some(path) => self.url(path),
            None => self.url(HOME_PATH),
        }
    }

    /// `path` with the error dict and `next_path` in the query string.
    pub fn error_url(&self, path: &str, error: &SesameError, next_path: Option<&str>) -> String {
        let dict = error.error_dict();
        let mut query = format!(
            "error_code={}&error_message={}",
            urlencoding::encode(&dict.error_code),
            urlencoding::encode(dict.error_message),
        );
        if let Some(next_path) = next_path {
            query.push_str("&next_path=");
            query.push_str(&urlencoding::encode(next_path));
        }

        format!("{}?{query}", self.url(path))
    }
}

/// Rejects anything that would leave the base URL: schemes, protocol-relative
/// URLs and backslashes browsers treat as slashes.
fn is_local_path(path: &str) -> bool {
    !path.contains("://") && !path.starts_with("//") && !path.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use sesame::ErrorCode;

    fn config() -> RedirectConfig {
        RedirectConfig::new("https://app.example.com/")
    }

    #[test]
    fn test_url_joins_with_single_slash() {
        let config = config();
        assert_eq!(config.url("spaces"), "https://app.example.com/spaces");
        assert_eq!(config.url("/spaces"), "https://app.example.com/spaces");
        assert_eq!(config.url(""), "https://app.example.com");
    }

    #[test]
    fn test_next_url() {
        let config = config();
        assert_eq!(
            config.next_url(Some("/spaces/projects")),
            "https://app.example.com/spaces/projects"
        );
        assert_eq!(config.next_url(None), "https://app.example.com/spaces");
    }

    #[test]
    fn test_next_url_stays_on_site() {
        let config = config();
        for path in ["https://evil.example.com", "//evil.example.com", "/\\evil.example.com"] {
            assert_eq!(config.next_url(Some(path)), "https://app.example.com/spaces");
        }
    }

    #[test]
    fn test_error_url() {
        let config = config();
        let error = SesameError::new(ErrorCode::UserDoesNotExist);

        assert_eq!(
            config.error_url(SIGN_IN_PATH, &error, None),
            "https://app.example.com/spaces/accounts/sign-in?error_code=5060&error_message=USER_DOES_NOT_EXIST"
        );
        assert_eq!(
            config.error_url(SIGN_IN_PATH, &error, Some("/spaces/a b")),
            "https://app.example.com/spaces/accounts/sign-in?error_code=5060&error_message=USER_DOES_NOT_EXIST&next_path=%2Fspaces%2Fa%20b"
        );
    }

    #[test]
    fn test_error_url_on_base() {
        let config = config();
        let error = SesameError::new(ErrorCode::UserAlreadyExist);

        assert_eq!(
            config.error_url("", &error, None),
            "https://app.example.com?error_code=5030&error_message=USER_ALREADY_EXIST"
        );
    }
}
