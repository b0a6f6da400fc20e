//! # Sesame Axum Integration
//!
//! Axum endpoints for magic-code sign-in and sign-up on top of [`sesame::Sesame`].
//!
//! | Route | Body | Response |
//! | --- | --- | --- |
//! | `POST /spaces/magic-generate` | JSON `{"email"}` | `200 {"key"}` or `400` with the error dict |
//! | `POST /spaces/magic-sign-in` | form `email`, `code`, `next_path` | `303` with the session cookie, or `303` back to sign-in with the error |
//! | `POST /spaces/magic-sign-up` | form `email`, `code`, `next_path` | same as sign-in |
//! | `GET /session` | session cookie | the current user and session |
//! | `GET /health` | | storage health |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use sesame::SesameBuilder;
//! use sesame_axum::{CookieConfig, RedirectConfig, routes};
//! # use sesame_core::services::{MagicCodeDispatcher, MagicCodeMessage};
//! # struct Discard;
//! # impl MagicCodeDispatcher for Discard { fn dispatch(&self, _: MagicCodeMessage) {} }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sesame = SesameBuilder::new()
//!         .with_storage(Arc::new(sesame_core::storage::MemoryStorage::new()))
//!         .with_dispatcher(Arc::new(Discard))
//!         .build()
//!         .await?;
//!
//!     let app: Router = routes(Arc::new(sesame), RedirectConfig::new("http://localhost:3000"))
//!         .with_cookie_config(CookieConfig::development())
//!         .build();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod redirect;
mod routes;
mod state;
mod types;

pub use error::{AuthError, Result};
pub use extractors::SessionTokenFromCookie;
pub use routes::create_router;
pub use state::AuthState;
pub use types::{
    ConnectionInfo, CookieConfig, CookieSameSite, GenerateRequest, GenerateResponse,
    HealthResponse, MagicForm, RedirectConfig, SessionResponse,
};

use axum::Router;
use sesame::Sesame;
use sesame_core::RepositoryProvider;
use std::sync::Arc;

/// Create the magic-code routes, redirecting relative to `redirect_config.base_url`.
///
/// The router can be merged into an application or nested under a prefix.
pub fn routes<R>(sesame: Arc<Sesame<R>>, redirect_config: RedirectConfig) -> AuthRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    AuthRouterBuilder {
        sesame,
        redirect_config,
        cookie_config: CookieConfig::default(),
    }
}

pub struct AuthRouterBuilder<R: RepositoryProvider> {
    sesame: Arc<Sesame<R>>,
    redirect_config: RedirectConfig,
    cookie_config: CookieConfig,
}

impl<R: RepositoryProvider + 'static> AuthRouterBuilder<R> {
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    pub fn with_redirect_config(mut self, config: RedirectConfig) -> Self {
        self.redirect_config = config;
        self
    }

    pub fn build(self) -> Router {
        create_router(self.sesame, self.redirect_config, self.cookie_config)
    }
}

impl<R: RepositoryProvider + 'static> From<AuthRouterBuilder<R>> for Router {
    fn from(builder: AuthRouterBuilder<R>) -> Self {
        builder.build()
    }
}
