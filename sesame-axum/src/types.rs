use serde::{Deserialize, Serialize};
use sesame::{RequestMetadata, Session, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Identifier of the issued code; not the code itself.
    pub key: String,
}

/// The form posted by the sign-in and sign-up pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagicForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    pub next_path: Option<String>,
}

impl MagicForm {
    pub fn next_path(&self) -> Option<&str> {
        self.next_path.as_deref().filter(|path| !path.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub session: Session,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl From<ConnectionInfo> for RequestMetadata {
    fn from(info: ConnectionInfo) -> Self {
        RequestMetadata::new(info.user_agent, info.ip)
    }
}

/// Where the endpoints send the browser after a form post.
///
/// Every redirect target is joined onto `base_url`, which is also the origin
/// handed to code delivery.
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    pub base_url: String,
}

impl RedirectConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: CookieSameSite,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self::new("session_id")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CookieSameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl CookieConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http_only: true,
            secure: true,
            same_site: CookieSameSite::Lax,
            path: "/".to_string(),
        }
    }

    /// Same as the default but without `Secure`, so the cookie survives plain HTTP.
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Self::default()
        }
    }
}
