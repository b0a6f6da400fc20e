use std::net::SocketAddr;

use axum::{
    RequestPartsExt,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{TypedHeader, extract::CookieJar, headers::UserAgent};
use sesame::SessionToken;

use crate::{
    error::AuthError,
    types::{ConnectionInfo, CookieConfig},
};

impl<S> FromRequestParts<S> for ConnectionInfo
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .extract::<Option<TypedHeader<UserAgent>>>()
            .await
            .map_err(|_| AuthError::BadRequest("Invalid user agent header".to_string()))?
            .map(|ua| ua.to_string());

        // Absent unless the app is served with `into_make_service_with_connect_info`.
        let ip = parts
            .extract::<ConnectInfo<SocketAddr>>()
            .await
            .ok()
            .map(|addr| addr.ip().to_string());

        Ok(ConnectionInfo { ip, user_agent })
    }
}

/// The session token from the cookie named by the router's [`CookieConfig`].
pub struct SessionTokenFromCookie(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for SessionTokenFromCookie
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .extensions
            .get::<CookieConfig>()
            .map(|config| config.name.clone())
            .unwrap_or_else(|| CookieConfig::default().name);

        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| AuthError::BadRequest("Invalid cookie header".to_string()))?;

        let token = jar
            .get(&name)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .map(SessionToken::new);

        Ok(SessionTokenFromCookie(token))
    }
}
