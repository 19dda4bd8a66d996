//! Authentication rejection responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Terminal rejection from the token verifier.
///
/// Every post-token failure (bad signature, expired, refresh token,
/// insufficient role, subject gone) collapses into `Forbidden` so callers
/// cannot tell which check failed. A failed liveness query is not a
/// verdict about the token and surfaces as a server error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token in the Authorization header
    NoToken,
    /// Token rejected, role insufficient, or subject no longer exists
    Forbidden,
    /// The liveness-check query itself failed
    StoreUnavailable,
}

#[derive(Serialize)]
struct ErrorMessage {
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::NoToken => (StatusCode::UNAUTHORIZED, "No token provided"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            AuthError::StoreUnavailable => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };
        (status, Json(ErrorMessage { message })).into_response()
    }
}
