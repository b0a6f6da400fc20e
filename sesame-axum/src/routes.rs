use std::sync::Arc;

use axum::{
    Extension, Form, Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use sesame::{ErrorCode, Sesame, Session};
use sesame_core::RepositoryProvider;

use crate::{
    error::{AuthError, Result},
    extractors::SessionTokenFromCookie,
    redirect::{SET_PASSWORD_PATH, SIGN_IN_PATH},
    state::AuthState,
    types::*,
};

pub fn create_router<R>(
    sesame: Arc<Sesame<R>>,
    redirect_config: RedirectConfig,
    cookie_config: CookieConfig,
) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AuthState {
        sesame,
        redirect: Arc::new(redirect_config),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/session", get(get_session_handler))
        .route("/spaces/magic-generate", post(magic_generate_handler))
        .route("/spaces/magic-sign-in", post(magic_sign_in_handler))
        .route("/spaces/magic-sign-up", post(magic_sign_up_handler))
        .with_state(state)
        .layer(Extension(cookie_config))
}

async fn health_handler<R>(State(state): State<AuthState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.sesame.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn get_session_handler<R>(
    State(state): State<AuthState<R>>,
    SessionTokenFromCookie(session_token): SessionTokenFromCookie,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let session_token = session_token.ok_or(AuthError::Unauthorized)?;

    let session = state
        .sesame
        .get_session(&session_token)
        .await?
        .ok_or(AuthError::Unauthorized)?;
    let user = state
        .sesame
        .get_user(&session.user_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(SessionResponse { user, session }))
}

async fn magic_generate_handler<R>(
    State(state): State<AuthState<R>>,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let issued = state
        .sesame
        .magic_generate(&request.email, &state.redirect.base_url)
        .await?;

    Ok(Json(GenerateResponse {
        key: issued.identifier,
    }))
}

async fn magic_sign_in_handler<R>(
    State(state): State<AuthState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    connection_info: ConnectionInfo,
    Form(form): Form<MagicForm>,
) -> Response
where
    R: RepositoryProvider,
{
    let next_path = form.next_path();

    match state
        .sesame
        .magic_sign_in(&form.email, &form.code, connection_info.into())
        .await
    {
        Ok(outcome) => {
            let location = if outcome.requires_password_setup {
                state.redirect.url(SET_PASSWORD_PATH)
            } else {
                state.redirect.next_url(next_path)
            };
            signed_in(&cookie_config, &outcome.session, &location)
        }
        Err(err) => {
            Redirect::to(&state.redirect.error_url(SIGN_IN_PATH, &err, next_path)).into_response()
        }
    }
}

async fn magic_sign_up_handler<R>(
    State(state): State<AuthState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    connection_info: ConnectionInfo,
    Form(form): Form<MagicForm>,
) -> Response
where
    R: RepositoryProvider,
{
    let next_path = form.next_path();

    match state
        .sesame
        .magic_sign_up(&form.email, &form.code, connection_info.into())
        .await
    {
        Ok(outcome) => signed_in(
            &cookie_config,
            &outcome.session,
            &state.redirect.next_url(next_path),
        ),
        Err(err) => {
            // An existing account goes back to the landing page rather than sign-in.
            let path = if err.code == ErrorCode::UserAlreadyExist {
                ""
            } else {
                SIGN_IN_PATH
            };
            Redirect::to(&state.redirect.error_url(path, &err, next_path)).into_response()
        }
    }
}

/// A `303 See Other` to `location` carrying the session cookie.
fn signed_in(cookie_config: &CookieConfig, session: &Session, location: &str) -> Response {
    let cookie = session_cookie(cookie_config, session);

    (
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to(location),
    )
        .into_response()
}

fn session_cookie(config: &CookieConfig, session: &Session) -> Cookie<'static> {
    let same_site = match config.same_site {
        CookieSameSite::Strict => SameSite::Strict,
        CookieSameSite::Lax => SameSite::Lax,
        CookieSameSite::None => SameSite::None,
    };

    Cookie::build((config.name.clone(), session.token.as_str().to_string()))
        .path(config.path.clone())
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(same_site)
        .build()
}
