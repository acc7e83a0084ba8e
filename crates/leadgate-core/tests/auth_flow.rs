//! End-to-end auth flows through the real router.

use chrono::Duration;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use leadgate_core::auth::jwt;
use leadgate_core::models::user::{self, Entity as User};
use leadgate_core::testing::TestApp;

async fn find_user(app: &TestApp, email: &str) -> user::Model {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(&app.db)
        .await
        .unwrap()
        .expect("user not found")
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = TestApp::new().await;

    let res = app.get("/health").await;
    assert_eq!(res.status, 200);

    let res = app.get("/api/nope").await;
    assert_eq!(res.status, 404);
    assert_eq!(res.error_code().as_deref(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn signup_login_profile_flow() {
    let app = TestApp::new().await;

    let user = app.signup_user("a@x.com", "Secret123!", "A").await;
    assert_eq!(user["email"], "a@x.com");
    assert_eq!(user["is_verified"], false);

    let (access, _refresh) = app.login("a@x.com", "Secret123!").await;

    let res = app.get_with_auth("/api/auth/profile", &access).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["email"], "a@x.com");
    assert_eq!(res.data()["name"], "A");
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;

    let res = app
        .post(
            "/api/auth/signup",
            serde_json::json!({ "email": "a@x.com", "password": "Other456!", "name": "B" }),
        )
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.error_code().as_deref(), Some("USER_EXISTS"));
}

#[tokio::test]
async fn signup_validates_payload() {
    let app = TestApp::new().await;

    let res = app
        .post(
            "/api/auth/signup",
            serde_json::json!({ "email": "not-an-email", "password": "Secret123!", "name": "A" }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error_code().as_deref(), Some("VALIDATION_ERROR"));

    let res = app
        .post(
            "/api/auth/signup",
            serde_json::json!({ "email": "a@x.com", "password": "short", "name": "A" }),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn login_failures_do_not_reveal_accounts() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;

    let wrong_password = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "email": "a@x.com", "password": "WrongPass1!" }),
        )
        .await;
    let no_such_user = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "email": "nobody@x.com", "password": "Secret123!" }),
        )
        .await;

    assert_eq!(wrong_password.status, 401);
    assert_eq!(no_such_user.status, 401);
    assert_eq!(wrong_password.json()["error"], no_such_user.json()["error"]);
}

#[tokio::test]
async fn gate_distinguishes_missing_expired_and_invalid_tokens() {
    let app = TestApp::new().await;

    // Missing: the client never sent credentials.
    let res = app.get("/api/auth/profile").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code().as_deref(), Some("ACCESS_TOKEN_REQUIRED"));

    // Expired but well-signed: the client should refresh.
    let expired = jwt::issue_token(
        1,
        "a@x.com",
        &app.config.jwt_access_secret,
        Duration::minutes(-5),
    )
    .unwrap();
    let res = app.get_with_auth("/api/auth/profile", &expired).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code().as_deref(), Some("ACCESS_TOKEN_EXPIRED"));

    // Anything else: the client should reauthenticate.
    let res = app.get_with_auth("/api/auth/profile", "garbage").await;
    assert_eq!(res.status, 403);
    assert_eq!(res.error_code().as_deref(), Some("INVALID_ACCESS_TOKEN"));

    // A refresh token is not an access token.
    let refresh_as_access =
        jwt::issue_refresh_token(1, "a@x.com", &app.config.jwt_refresh_secret).unwrap();
    let res = app.get_with_auth("/api/auth/profile", &refresh_as_access).await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn refresh_rotates_and_detects_reuse() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;
    let (_access, refresh) = app.login("a@x.com", "Secret123!").await;

    let cookie = format!("refresh_token={}", refresh);
    let res = app.post_with_cookie("/api/auth/refresh", &cookie).await;
    assert_eq!(res.status, 200);

    let rotated = res.refresh_cookie().expect("cookie re-set on rotation");
    assert_ne!(rotated, refresh);

    // The fresh access token works on the gate.
    let new_access = res.data()["access_token"].as_str().unwrap().to_string();
    let res = app.get_with_auth("/api/auth/profile", &new_access).await;
    assert_eq!(res.status, 200);

    // Replaying the consumed token is the reuse signal.
    let res = app.post_with_cookie("/api/auth/refresh", &cookie).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.error_code().as_deref(), Some("REFRESH_TOKEN_INVALID"));

    // The replacement is still live.
    let res = app
        .post_with_cookie("/api/auth/refresh", &format!("refresh_token={}", rotated))
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn refresh_requires_the_cookie() {
    let app = TestApp::new().await;

    let res = app
        .request(axum::http::Method::POST, "/api/auth/refresh", None, None, None)
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.error_code().as_deref(), Some("REFRESH_TOKEN_REQUIRED"));
}

#[tokio::test]
async fn logout_revokes_and_clears_the_cookie() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;
    let (_access, refresh) = app.login("a@x.com", "Secret123!").await;
    let cookie = format!("refresh_token={}", refresh);

    let res = app.post_with_cookie("/api/auth/logout", &cookie).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.refresh_cookie().as_deref(), Some(""));

    let res = app.post_with_cookie("/api/auth/refresh", &cookie).await;
    assert_eq!(res.status, 401);

    // Logging out again, or with no cookie at all, still succeeds.
    let res = app.post_with_cookie("/api/auth/logout", &cookie).await;
    assert_eq!(res.status, 200);
    let res = app
        .request(axum::http::Method::POST, "/api/auth/logout", None, None, None)
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn logout_all_kills_every_session() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;
    let (access, first) = app.login("a@x.com", "Secret123!").await;
    let (_access2, second) = app.login("a@x.com", "Secret123!").await;

    let res = app
        .request(
            axum::http::Method::POST,
            "/api/auth/logout-all",
            Some(&access),
            None,
            None,
        )
        .await;
    assert_eq!(res.status, 200);

    for refresh in [first, second] {
        let res = app
            .post_with_cookie("/api/auth/refresh", &format!("refresh_token={}", refresh))
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.error_code().as_deref(), Some("REFRESH_TOKEN_INVALID"));
    }
}

#[tokio::test]
async fn email_verification_flow() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;

    let token = find_user(&app, "a@x.com")
        .await
        .verification_token
        .expect("signup stores a verification token");

    let res = app.get("/api/auth/verify-email").await;
    assert_eq!(res.status, 400);

    let res = app.get("/api/auth/verify-email?token=bogus").await;
    assert_eq!(res.status, 400);
    assert_eq!(
        res.error_code().as_deref(),
        Some("INVALID_VERIFICATION_TOKEN")
    );

    let res = app
        .get(&format!("/api/auth/verify-email?token={}", token))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["is_verified"], true);

    // The token is single-use.
    let res = app
        .get(&format!("/api/auth/verify-email?token={}", token))
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn password_reset_revokes_sessions_and_changes_the_password() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;
    let (_access, refresh) = app.login("a@x.com", "Secret123!").await;

    // Identical response whether or not the account exists.
    let known = app
        .post(
            "/api/auth/request-password-reset",
            serde_json::json!({ "email": "a@x.com" }),
        )
        .await;
    let unknown = app
        .post(
            "/api/auth/request-password-reset",
            serde_json::json!({ "email": "nobody@x.com" }),
        )
        .await;
    assert_eq!(known.status, 200);
    assert_eq!(unknown.status, 200);
    assert_eq!(known.body, unknown.body);

    let token = find_user(&app, "a@x.com")
        .await
        .reset_token
        .expect("reset token stored");

    let res = app
        .post(
            "/api/auth/reset-password",
            serde_json::json!({ "token": token, "password": "NewSecret456!" }),
        )
        .await;
    assert_eq!(res.status, 200);

    // Sessions from before the credential change are dead.
    let res = app
        .post_with_cookie("/api/auth/refresh", &format!("refresh_token={}", refresh))
        .await;
    assert_eq!(res.status, 401);

    // Old password out, new password in.
    let res = app
        .post(
            "/api/auth/login",
            serde_json::json!({ "email": "a@x.com", "password": "Secret123!" }),
        )
        .await;
    assert_eq!(res.status, 401);
    app.login("a@x.com", "NewSecret456!").await;

    // The reset token is single-use.
    let res = app
        .post(
            "/api/auth/reset-password",
            serde_json::json!({ "token": token, "password": "Another789!" }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.error_code().as_deref(), Some("INVALID_RESET_TOKEN"));
}

#[tokio::test]
async fn delete_account_removes_user_and_sessions() {
    let app = TestApp::new().await;
    app.signup_user("a@x.com", "Secret123!", "A").await;
    let (access, refresh) = app.login("a@x.com", "Secret123!").await;

    let res = app.delete_with_auth("/api/auth/delete-account", &access).await;
    assert_eq!(res.status, 200);

    let res = app
        .post_with_cookie("/api/auth/refresh", &format!("refresh_token={}", refresh))
        .await;
    assert_eq!(res.status, 401);

    // The access token still verifies cryptographically, but the record is gone.
    let res = app.get_with_auth("/api/auth/profile", &access).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn signup_attaches_password_to_google_only_account() {
    let app = TestApp::new().await;

    // Simulate an earlier Google login.
    let resolved =
        leadgate_core::auth::session::resolve_google_user(&app.db, "goog-sub-1", "a@x.com", "A")
            .await
            .unwrap();
    assert!(resolved.password_hash.is_none());

    let res = app
        .post(
            "/api/auth/signup",
            serde_json::json!({ "email": "a@x.com", "password": "Secret123!", "name": "A" }),
        )
        .await;
    assert_eq!(res.status, 201);
    assert!(
        res.data()["message"]
            .as_str()
            .unwrap()
            .contains("synced")
    );

    // Still one account, now usable both ways.
    let user_model = find_user(&app, "a@x.com").await;
    assert_eq!(user_model.id, resolved.id);
    assert!(user_model.password_hash.is_some());
    assert_eq!(user_model.google_id.as_deref(), Some("goog-sub-1"));
    app.login("a@x.com", "Secret123!").await;
}
