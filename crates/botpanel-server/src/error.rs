//! Error taxonomy for request handling.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use botpanel_core::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Bad form input or a taken email. Shown to the user, nothing changes.
    #[error("{0}")]
    Validation(String),

    /// Wrong credentials.
    #[error("{0}")]
    Auth(String),

    /// Authenticated, but not allowed here.
    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),

    #[error("Session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Malformed upload: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),
}

impl From<argon2::password_hash::Error> for PanelError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(e)
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::Auth(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "403 Forbidden").into_response(),
            Self::Upload(e) => (e.status(), e.body_text()).into_response(),
            other => {
                error!(error = %other, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
            }
        }
    }
}
