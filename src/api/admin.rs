//! Admin-gated endpoints: user management, card and archetype catalogs.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use super::users::{LoginRequest, LoginResponse};
use crate::auth::AdminAuth;
use crate::db::{Database, User};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password::verify_password;

#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(AdminState);

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/user/debug", get(user_debug))
        .route("/user/login", post(admin_login))
        .route("/user/{id}", get(get_user_admin).delete(delete_user))
        .route("/user/make_admin/{id}", put(make_admin))
        .route("/user/remove_admin/{id}", put(remove_admin))
        .route("/card/debug", get(card_debug))
        .route("/archetype/debug", get(archetype_debug))
        .route("/archetype/create", post(create_archetype))
        .route("/archetype/{id}", get(find_archetype))
        .with_state(state)
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Admin login: same flow as the normal login, plus an admin check after
/// password verification. Tokens are only worth minting for admins here.
async fn admin_login(
    State(state): State<AdminState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let credential = payload
        .credential
        .ok_or_else(|| ApiError::bad_request("Credential is required"))?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::bad_request("Password is required"))?;

    let user = if credential.contains('@') {
        state.db.users().find_by_email(&credential).await
    } else {
        state.db.users().find_by_username(&credential).await
    }
    .db_err("Failed to look up user")?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password(&user.password, &password) {
        return Err(ApiError::unauthorized("Wrong password"));
    }
    if !user.admin {
        return Err(ApiError::unauthorized("User is not admin"));
    }

    let token = state
        .jwt
        .issue_access_token(user.id, user.admin)
        .map_err(|_| ApiError::internal("Failed to issue token"))?;
    let refresh_token = state
        .jwt
        .issue_refresh_token(user.id, user.admin)
        .map_err(|_| ApiError::internal("Failed to issue token"))?;

    Ok(Json(LoginResponse {
        token,
        refresh_token,
    }))
}

/// Full user rows, password hash excluded.
async fn user_debug(
    State(state): State<AdminState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .db
        .users()
        .list_all()
        .await
        .db_err("Failed to list users")?;
    Ok(Json(users))
}

async fn get_user_admin(
    State(state): State<AdminState>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .find_by_id(id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

/// Load the requester behind a verified admin token. The liveness check
/// has already passed, but the row can vanish in between.
async fn load_requester(state: &AdminState, id: i64) -> Result<User, ApiError> {
    state
        .db
        .users()
        .find_by_id(id)
        .await
        .db_err("Failed to get requester")?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Promote a user to admin. Touching an existing admin requires
/// superadmin. The requester is identified by the token, never the body.
async fn make_admin(
    State(state): State<AdminState>,
    AdminAuth(identity): AdminAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = load_requester(&state, identity.id).await?;

    let target = state
        .db
        .users()
        .find_by_id(id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if target.admin && !requester.superadmin {
        return Err(ApiError::forbidden("Forbidden"));
    }

    state
        .db
        .users()
        .set_admin(id, true)
        .await
        .db_err("Failed to update user")?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User is now admin",
        }),
    ))
}

/// Demote an admin. Superadmin only.
async fn remove_admin(
    State(state): State<AdminState>,
    AdminAuth(identity): AdminAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = load_requester(&state, identity.id).await?;

    if !requester.superadmin {
        return Err(ApiError::forbidden("Forbidden"));
    }

    let updated = state
        .db
        .users()
        .set_admin(id, false)
        .await
        .db_err("Failed to update user")?;
    if !updated {
        return Err(ApiError::not_found("User not found"));
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User is no longer admin",
        }),
    ))
}

/// Delete a user. Deleting an admin requires superadmin. Deletion acts as
/// instant revocation of the target's outstanding tokens.
async fn delete_user(
    State(state): State<AdminState>,
    AdminAuth(identity): AdminAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let target = state
        .db
        .users()
        .find_by_id(id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if target.admin {
        let requester = load_requester(&state, identity.id).await?;
        if !requester.superadmin {
            return Err(ApiError::forbidden("Forbidden"));
        }
    }

    state
        .db
        .users()
        .delete(id)
        .await
        .db_err("Failed to delete user")?;

    Ok(Json(MessageResponse {
        message: "User deleted",
    }))
}

async fn card_debug(
    State(state): State<AdminState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let cards = state
        .db
        .cards()
        .list_all()
        .await
        .db_err("Failed to list cards")?;
    Ok(Json(cards))
}

async fn archetype_debug(
    State(state): State<AdminState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, ApiError> {
    let archetypes = state
        .db
        .archetypes()
        .list_all()
        .await
        .db_err("Failed to list archetypes")?;
    Ok(Json(archetypes))
}

#[derive(Deserialize)]
struct CreateArchetypeRequest {
    name: Option<String>,
}

async fn create_archetype(
    State(state): State<AdminState>,
    _auth: AdminAuth,
    Json(payload): Json<CreateArchetypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload
        .name
        .ok_or_else(|| ApiError::bad_request("Archetype name is required"))?;

    let existing = state
        .db
        .archetypes()
        .find_by_name(&name)
        .await
        .db_err("Failed to look up archetype")?;
    if existing.is_some() {
        return Err(ApiError::conflict("Archetype already exists"));
    }

    state
        .db
        .archetypes()
        .create(&name)
        .await
        .db_err("Failed to create archetype")?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Archetype created",
        }),
    ))
}

#[derive(Serialize)]
struct ArchetypeResponse {
    id: i64,
    name: String,
}

async fn find_archetype(
    State(state): State<AdminState>,
    _auth: AdminAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let archetype = state
        .db
        .archetypes()
        .find_by_id(id)
        .await
        .db_err("Failed to get archetype")?
        .ok_or_else(|| ApiError::not_found("Archetype not found"))?;

    Ok(Json(ArchetypeResponse {
        id: archetype.id,
        name: archetype.name,
    }))
}
