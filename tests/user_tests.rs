mod common;

use axum::http::StatusCode;
use common::{body_json, expect_json, setup};
use serde_json::json;

#[tokio::test]
async fn create_user_succeeds() {
    let app = setup().await;

    let payload = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "Password1"
    });
    let response = app
        .post_json("/user/create", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(body["message"], "User created");

    let user = app
        .db
        .users()
        .find_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(!user.admin);
}

#[tokio::test]
async fn create_user_requires_all_fields() {
    let app = setup().await;

    let payload = json!({ "email": "a@example.com", "password": "Password1" });
    let response = app
        .post_json("/user/create", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["message"], "Username is required");

    let payload = json!({ "username": "a", "email": "a@example.com" });
    let response = app
        .post_json("/user/create", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["message"], "Password is required");

    let payload = json!({ "username": "a", "password": "Password1" });
    let response = app
        .post_json("/user/create", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["message"], "Email is required");
}

#[tokio::test]
async fn create_user_rejects_weak_password() {
    let app = setup().await;

    // No uppercase, no lowercase, too short
    for password in ["password1", "PASSWORD1", "Pass1"] {
        let payload = json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": password
        });
        let response = app
            .post_json("/user/create", None, &payload.to_string())
            .await;
        let body = expect_json(response, StatusCode::BAD_REQUEST).await;
        assert_eq!(body["message"], "Password is not valid", "accepted {password:?}");
    }
}

#[tokio::test]
async fn create_user_rejects_malformed_email() {
    let app = setup().await;

    for email in ["not-an-email", "a@b", "a@b.c", "@example.com"] {
        let payload = json!({
            "username": "alice",
            "email": email,
            "password": "Password1"
        });
        let response = app
            .post_json("/user/create", None, &payload.to_string())
            .await;
        let body = expect_json(response, StatusCode::BAD_REQUEST).await;
        assert_eq!(body["message"], "Email is not valid", "accepted {email:?}");
    }
}

#[tokio::test]
async fn create_user_rejects_duplicates() {
    let app = setup().await;
    app.create_user("alice", "alice@example.com", "Password1").await;

    // Same username, different email
    let payload = json!({
        "username": "alice",
        "email": "other@example.com",
        "password": "Password1"
    });
    let response = app
        .post_json("/user/create", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::CONFLICT).await;
    assert_eq!(body["message"], "User already exists");

    // Same email, different username
    let payload = json!({
        "username": "alicia",
        "email": "alice@example.com",
        "password": "Password1"
    });
    let response = app
        .post_json("/user/create", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::CONFLICT).await;
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn login_returns_token_pair() {
    let app = setup().await;
    app.create_user("alice", "alice@example.com", "Password1").await;

    let payload = json!({ "credential": "alice", "password": "Password1" });
    let response = app
        .post_json("/user/login", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::OK).await;
    let token = body["token"].as_str().unwrap();
    let refresh = body["refresh_token"].as_str().unwrap();
    assert_ne!(token, refresh);

    // The access token works against a protected route
    let response = app.get("/user", Some(token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_by_email() {
    let app = setup().await;
    app.create_user("alice", "alice@example.com", "Password1").await;

    let payload = json!({ "credential": "alice@example.com", "password": "Password1" });
    let response = app
        .post_json("/user/login", None, &payload.to_string())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = setup().await;
    app.create_user("alice", "alice@example.com", "Password1").await;

    let payload = json!({ "credential": "alice", "password": "Password2" });
    let response = app
        .post_json("/user/login", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["message"], "Wrong password");
}

#[tokio::test]
async fn login_rejects_unknown_user() {
    let app = setup().await;

    let payload = json!({ "credential": "nobody", "password": "Password1" });
    let response = app
        .post_json("/user/login", None, &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::NOT_FOUND).await;
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn list_users_returns_public_fields_only() {
    let app = setup().await;
    let id = app.create_user("alice", "alice@example.com", "Password1").await;
    app.create_user("bob", "bob@example.com", "Password1").await;
    let token = app.access_token(id, false);

    let response = app.get("/user", Some(&token)).await;
    let body = expect_json(response, StatusCode::OK).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user["username"].is_string());
        assert!(user["victories"].is_i64());
        assert!(user.get("password").is_none());
        assert!(user.get("email").is_none());
    }
}

#[tokio::test]
async fn get_user_by_id() {
    let app = setup().await;
    let alice = app.create_user("alice", "alice@example.com", "Password1").await;
    let bob = app.create_user("bob", "bob@example.com", "Password1").await;
    let token = app.access_token(alice, false);

    let response = app.get(&format!("/user/{bob}"), Some(&token)).await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["id"], bob);
    assert_eq!(body["username"], "bob");
    assert!(body.get("email").is_none());

    let response = app.get("/user/99999", Some(&token)).await;
    let body = expect_json(response, StatusCode::NOT_FOUND).await;
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn profile_returns_the_callers_own_row() {
    let app = setup().await;
    app.create_user("alice", "alice@example.com", "Password1").await;
    let bob = app.create_user("bob", "bob@example.com", "Password1").await;
    let token = app.access_token(bob, false);

    let response = app.get("/user/profile", Some(&token)).await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["id"], bob);
    assert_eq!(body["username"], "bob");
}

#[tokio::test]
async fn update_user_profile() {
    let app = setup().await;
    let id = app.create_user("alice", "alice@example.com", "Password1").await;
    let token = app.access_token(id, false);

    let payload = json!({ "username": "alice2" });
    let response = app
        .put_json("/user/update", Some(&token), &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["message"], "Missing parameters");

    let payload = json!({
        "username": "alice2",
        "email": "broken",
        "profile_picture": "pic.png"
    });
    let response = app
        .put_json("/user/update", Some(&token), &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["message"], "Email wrong format");

    let payload = json!({
        "username": "alice2",
        "email": "alice2@example.com",
        "profile_picture": "pic.png"
    });
    let response = app
        .put_json("/user/update", Some(&token), &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(body["message"], "User updated");

    let user = app.db.users().find_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.username, "alice2");
    assert_eq!(user.profile_picture.as_deref(), Some("pic.png"));
}

#[tokio::test]
async fn update_password_and_login_with_it() {
    let app = setup().await;
    let id = app.create_user("alice", "alice@example.com", "Password1").await;
    let token = app.access_token(id, false);

    let payload = json!({ "password": "weak" });
    let response = app
        .put_json("/user/update/password", Some(&token), &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["message"], "Password wrong format");

    let payload = json!({ "password": "NewPassword2" });
    let response = app
        .put_json("/user/update/password", Some(&token), &payload.to_string())
        .await;
    let body = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(body["message"], "User password updated");

    let payload = json!({ "credential": "alice", "password": "NewPassword2" });
    let response = app
        .post_json("/user/login", None, &payload.to_string())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json!({ "credential": "alice", "password": "Password1" });
    let response = app
        .post_json("/user/login", None, &payload.to_string())
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_then_login_roundtrip() {
    let app = setup().await;

    let payload = json!({
        "username": "carol",
        "email": "carol@example.com",
        "password": "Password1",
        "profile_picture": "carol.png"
    });
    let response = app
        .post_json("/user/create", None, &payload.to_string())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = json!({ "credential": "carol", "password": "Password1" });
    let response = app
        .post_json("/user/login", None, &payload.to_string())
        .await;
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap();

    let response = app.get("/user/profile", Some(token)).await;
    let body = expect_json(response, StatusCode::OK).await;
    assert_eq!(body["username"], "carol");
    assert_eq!(body["profile_picture"], "carol.png");
}
