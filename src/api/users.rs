use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, AuthIdentity};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password::{hash_password, verify_password};
use crate::validate::{check_email, check_password};

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", get(get_all_users))
        .route("/profile", get(profile_user))
        .route("/{id}", get(get_user_by_id))
        .route("/create", post(create_user))
        .route("/login", post(login_user))
        .route("/update", put(update_user))
        .route("/update/password", put(update_user_password))
        .with_state(state)
}

async fn get_all_users(
    State(state): State<UsersState>,
    _auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .db
        .users()
        .list_public()
        .await
        .db_err("Failed to list users")?;
    Ok(Json(users))
}

async fn get_user_by_id(
    State(state): State<UsersState>,
    _auth: Auth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .db
        .users()
        .profile(id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(profile))
}

/// The caller's own profile. The id comes from the verified token, not
/// from the request.
async fn profile_user(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .db
        .users()
        .profile(identity.id)
        .await
        .db_err("Failed to get profile")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
struct CreateUserRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    profile_picture: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn create_user(
    State(state): State<UsersState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload
        .username
        .ok_or_else(|| ApiError::bad_request("Username is required"))?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::bad_request("Password is required"))?;
    let email = payload
        .email
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    if !check_password(&password) {
        return Err(ApiError::bad_request("Password is not valid"));
    }
    if !check_email(&email) {
        return Err(ApiError::bad_request("Email is not valid"));
    }

    let taken = state
        .db
        .users()
        .credential_taken(&username, &email)
        .await
        .db_err("Failed to check user availability")?;
    if taken {
        return Err(ApiError::conflict("User already exists"));
    }

    let password_hash =
        hash_password(&password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    state
        .db
        .users()
        .create(
            &username,
            &email,
            &password_hash,
            payload.profile_picture.as_deref(),
        )
        .await
        .db_err("Failed to create user")?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created",
        }),
    ))
}

#[derive(Deserialize)]
pub(super) struct LoginRequest {
    pub credential: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub(super) struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
}

/// Authenticate by username or email (an `@` in the credential selects
/// email) and mint an access/refresh token pair.
async fn login_user(
    State(state): State<UsersState>,
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

#[derive(Deserialize)]
struct UpdateUserRequest {
    username: Option<String>,
    email: Option<String>,
    profile_picture: Option<String>,
}

/// Update the caller's own profile. The subject id is taken from the
/// token so a spoofed id in the body cannot touch another account.
async fn update_user(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(email), Some(profile_picture)) =
        (payload.username, payload.email, payload.profile_picture)
    else {
        return Err(ApiError::bad_request("Missing parameters"));
    };

    if !check_email(&email) {
        return Err(ApiError::bad_request("Email wrong format"));
    }

    let updated = state
        .db
        .users()
        .update_profile(identity.id, &username, &email, Some(&profile_picture))
        .await
        .db_err("Failed to update user")?;
    if !updated {
        return Err(ApiError::not_found("User not found"));
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User updated",
        }),
    ))
}

#[derive(Deserialize)]
struct UpdatePasswordRequest {
    password: Option<String>,
}

async fn update_user_password(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = payload
        .password
        .ok_or_else(|| ApiError::bad_request("Missing parameters"))?;

    if !check_password(&password) {
        return Err(ApiError::bad_request("Password wrong format"));
    }

    let password_hash =
        hash_password(&password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    let updated = state
        .db
        .users()
        .update_password(identity.id, &password_hash)
        .await
        .db_err("Failed to update password")?;
    if !updated {
        return Err(ApiError::not_found("User not found"));
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User password updated",
        }),
    ))
}
