use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sesame::SesameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// A flow failure, reported with its error dict.
    #[error(transparent)]
    Sesame(#[from] SesameError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl From<sesame_core::Error> for AuthError {
    fn from(err: sesame_core::Error) -> Self {
        tracing::error!(error = %err, "Request failed");
        AuthError::InternalError(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Sesame(err) => (StatusCode::BAD_REQUEST, Json(err.error_dict())).into_response(),
            AuthError::BadRequest(msg) => message(StatusCode::BAD_REQUEST, &msg),
            AuthError::InternalError(_) => {
                message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::Unauthorized => message(StatusCode::UNAUTHORIZED, "Unauthorized"),
        }
    }
}

fn message(status: StatusCode, error_message: &str) -> Response {
    let body = Json(json!({
        "error": error_message,
        "code": status.as_u16()
    }));

    (status, body).into_response()
}

pub type Result<T> = std::result::Result<T, AuthError>;
