//! Axum extractors for bearer-token authentication.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use super::errors::AuthError;
use super::state::HasAuthBackend;

/// Post-decode policy applied by the shared verification algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthPolicy {
    /// Any live user with a valid access token.
    Plain,
    /// Valid access token whose admin claim is set.
    RequireAdmin,
}

/// Identity decoded from a verified access token.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub id: i64,
    pub admin: bool,
}

/// Extract the bearer token from the Authorization header.
/// The token is the second whitespace-separated segment ("Bearer <token>").
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.split_whitespace().nth(1)
}

/// Core verification chain shared by all extractor variants:
/// token present, signature and expiry valid, not a refresh token,
/// policy satisfied, subject still exists.
async fn verify_request<S>(
    parts: &Parts,
    state: &S,
    policy: AuthPolicy,
) -> Result<Identity, AuthError>
where
    S: HasAuthBackend + Send + Sync,
{
    let token = bearer_token(parts).ok_or(AuthError::NoToken)?;

    let claims = state
        .jwt()
        .decode(token)
        .map_err(|_| AuthError::Forbidden)?;

    // Access-gated endpoints never accept refresh tokens.
    if claims.refresh {
        return Err(AuthError::Forbidden);
    }

    if policy == AuthPolicy::RequireAdmin && !claims.admin {
        return Err(AuthError::Forbidden);
    }

    // Liveness check: deleting an account revokes its outstanding tokens.
    let exists = state.db().users().exists(claims.id).await.map_err(|e| {
        tracing::error!("Liveness check failed: {}", e);
        AuthError::StoreUnavailable
    })?;
    if !exists {
        return Err(AuthError::Forbidden);
    }

    Ok(Identity {
        id: claims.id,
        admin: claims.admin,
    })
}

/// Extractor for endpoints that require any authenticated, live user.
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        verify_request(parts, state, AuthPolicy::Plain)
            .await
            .map(Auth)
    }
}

/// Extractor for admin-gated endpoints. Admits only tokens whose admin
/// claim was set at issuance time and whose subject still exists.
pub struct AdminAuth(pub Identity);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        verify_request(parts, state, AuthPolicy::RequireAdmin)
            .await
            .map(AdminAuth)
    }
}

/// Identity-injecting extractor for self-service endpoints.
///
/// Same checks as `Auth`; handlers must use the carried subject id rather
/// than any client-supplied id, so a caller cannot operate on another
/// user's account by spoofing an id in the request body.
pub struct AuthIdentity(pub Identity);

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        verify_request(parts, state, AuthPolicy::Plain)
            .await
            .map(AuthIdentity)
    }
}
