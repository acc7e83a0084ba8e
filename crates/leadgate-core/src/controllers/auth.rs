use axum::http::StatusCode;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{generate_secure_token, hash_password, jwt, session};
use crate::config::Config;
use crate::error::LeadgateError;
use crate::extractors::AuthUser;
use crate::mailer::MailKind;
use crate::models::user::{self, Entity as User, UserResponse};
use crate::response::ApiResponse;

use super::AppState;

/// Name of the HTTP-only cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

// ── Request / Response types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Short-lived bearer token for the Authorization header. The refresh
    /// token travels only in the HTTP-only cookie.
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequestPayload {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
        .route("/verify-email", get(verify_email))
        .route("/request-password-reset", post(request_password_reset))
        .route("/reset-password", post(reset_password))
        .route("/profile", get(profile))
        .route("/delete-account", delete(delete_account))
}

// ── Cookie helpers ──

pub(crate) fn refresh_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(!config.is_dev())
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(jwt::REFRESH_TOKEN_TTL_DAYS))
        .build()
}

fn clear_refresh_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((REFRESH_COOKIE, "")).path("/").build())
}

fn validated<T: Validate>(payload: &T) -> Result<(), LeadgateError> {
    payload
        .validate()
        .map_err(|e| LeadgateError::Validation(e.to_string()))
}

// ── Handlers ──

/// Sign up a new user.
///
/// If the email belongs to an account that only ever logged in with Google,
/// the password is attached to that account instead of failing — the user
/// asked for a password on an address Google already verified.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<SignupResponse>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, ApiResponse<SignupResponse>), LeadgateError> {
    validated(&payload)?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?;

    let user_model = match existing {
        Some(found) if found.google_id.is_some() && found.password_hash.is_none() => {
            // Account linking: attach a password to a Google-only account.
            let mut active: user::ActiveModel = found.into();
            active.password_hash = Set(Some(hash_password(&payload.password)?));
            active.name = Set(payload.name);
            active.updated_at = Set(Utc::now().naive_utc());
            active.update(&state.db).await?
        }
        Some(_) => return Err(LeadgateError::UserAlreadyExists),
        None => {
            let now = Utc::now().naive_utc();
            user::ActiveModel {
                email: Set(payload.email.clone()),
                password_hash: Set(Some(hash_password(&payload.password)?)),
                google_id: Set(None),
                name: Set(payload.name),
                is_verified: Set(false),
                verification_token: Set(None),
                reset_token: Set(None),
                reset_token_expiry: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&state.db)
            .await?
        }
    };

    let message = if user_model.is_verified {
        "Account synced successfully. You can now login with password.".to_string()
    } else {
        // Fresh account: issue a verification token and email the link.
        let token = generate_secure_token();
        let mut active: user::ActiveModel = user_model.clone().into();
        active.verification_token = Set(Some(token.clone()));
        active.update(&state.db).await?;

        let mailer = state.mailer.clone();
        let address = user_model.email.clone();
        tokio::spawn(async move {
            mailer.send(&address, MailKind::VerifyEmail, &token).await;
        });

        "User created successfully. Please verify your email.".to_string()
    };

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(SignupResponse {
            message,
            user: UserResponse::from(user_model),
        }),
    ))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<AuthResponse>), LeadgateError> {
    validated(&payload)?;

    let (user_model, pair) =
        session::login(&state.db, &state.config, &payload.email, &payload.password).await?;

    let jar = jar.add(refresh_cookie(&state.config, pair.refresh_token));

    Ok((
        jar,
        ApiResponse::success(AuthResponse {
            access_token: pair.access_token,
            user: UserResponse::from(user_model),
        }),
    ))
}

/// Exchange the refresh cookie for a fresh token pair (rotation).
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<RefreshResponse>),
        (status = 401, description = "Missing, invalid or expired refresh token")
    ),
    tag = "auth"
)]
async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<RefreshResponse>), LeadgateError> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(LeadgateError::RefreshTokenRequired)?;

    let pair = session::rotate_refresh_token(&state.db, &state.config, &presented).await?;

    let jar = jar.add(refresh_cookie(&state.config, pair.refresh_token));

    Ok((
        jar,
        ApiResponse::success(RefreshResponse {
            access_token: pair.access_token,
        }),
    ))
}

/// Log out: revoke the cookie's refresh token and clear the cookie.
/// Always succeeds, even with no cookie or an already-dead token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<MessageResponse>)
    ),
    tag = "auth"
)]
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<MessageResponse>), LeadgateError> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        session::logout(&state.db, cookie.value()).await?;
    }

    Ok((
        clear_refresh_cookie(jar),
        ApiResponse::success(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    ))
}

/// Log out everywhere: revoke every refresh token of the authenticated user.
#[utoipa::path(
    post,
    path = "/api/auth/logout-all",
    responses(
        (status = 200, description = "All sessions revoked", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
async fn logout_all(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<MessageResponse>), LeadgateError> {
    session::logout_all(&state.db, user.user_id).await?;

    Ok((
        clear_refresh_cookie(jar),
        ApiResponse::success(MessageResponse {
            message: "Logged out from all devices successfully".to_string(),
        }),
    ))
}

/// Verify an email address with the emailed token.
#[utoipa::path(
    get,
    path = "/api/auth/verify-email",
    params(("token" = Option<String>, Query, description = "Verification token")),
    responses(
        (status = 200, description = "Email verified", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid token")
    ),
    tag = "auth"
)]
async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<ApiResponse<UserResponse>, LeadgateError> {
    let token = query
        .token
        .ok_or_else(|| LeadgateError::BadRequest("Verification token required".to_string()))?;

    let user_model = User::find()
        .filter(user::Column::VerificationToken.eq(&token))
        .one(&state.db)
        .await?
        .ok_or(LeadgateError::InvalidVerificationToken)?;

    let mut active: user::ActiveModel = user_model.into();
    active.is_verified = Set(true);
    active.verification_token = Set(None);
    active.updated_at = Set(Utc::now().naive_utc());
    let updated = active.update(&state.db).await?;

    Ok(ApiResponse::success(UserResponse::from(updated)))
}

/// Request a password-reset email.
///
/// The response is identical whether or not the account exists, and a
/// failed send is only logged — neither may leak account existence.
#[utoipa::path(
    post,
    path = "/api/auth/request-password-reset",
    request_body = PasswordResetRequestPayload,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = ApiResponse<MessageResponse>)
    ),
    tag = "auth"
)]
async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequestPayload>,
) -> Result<ApiResponse<MessageResponse>, LeadgateError> {
    validated(&payload)?;

    if let Some(user_model) = User::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&state.db)
        .await?
    {
        let token = generate_secure_token();
        let expiry = Utc::now().naive_utc() + Duration::hours(1);

        let mut active: user::ActiveModel = user_model.into();
        active.reset_token = Set(Some(token.clone()));
        active.reset_token_expiry = Set(Some(expiry));
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(&state.db).await?;

        let mailer = state.mailer.clone();
        let address = payload.email.clone();
        tokio::spawn(async move {
            mailer.send(&address, MailKind::PasswordReset, &token).await;
        });
    }

    Ok(ApiResponse::success(MessageResponse {
        message: "If the email exists, a reset link has been sent".to_string(),
    }))
}

/// Reset the password with an emailed token. Revokes every live session.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid or expired token")
    ),
    tag = "auth"
)]
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ApiResponse<MessageResponse>, LeadgateError> {
    validated(&payload)?;

    let now = Utc::now().naive_utc();
    let user_model = User::find()
        .filter(user::Column::ResetToken.eq(&payload.token))
        .filter(user::Column::ResetTokenExpiry.gt(now))
        .one(&state.db)
        .await?
        .ok_or(LeadgateError::InvalidResetToken)?;

    let user_id = user_model.id;
    let mut active: user::ActiveModel = user_model.into();
    active.password_hash = Set(Some(hash_password(&payload.password)?));
    active.reset_token = Set(None);
    active.reset_token_expiry = Set(None);
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    // Any session established before the credential change dies with it.
    session::logout_all(&state.db, user_id).await?;

    Ok(ApiResponse::success(MessageResponse {
        message: "Password reset successful".to_string(),
    }))
}

/// Fetch the authenticated user's record.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "User profile", body = ApiResponse<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ApiResponse<UserResponse>, LeadgateError> {
    let user_model = User::find_by_id(user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| LeadgateError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::success(UserResponse::from(user_model)))
}

/// Delete the authenticated user's account. Revokes every session first.
#[utoipa::path(
    delete,
    path = "/api/auth/delete-account",
    responses(
        (status = 200, description = "Account deleted", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<MessageResponse>), LeadgateError> {
    let user_model = User::find_by_id(user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| LeadgateError::NotFound("User not found".to_string()))?;

    session::logout_all(&state.db, user_model.id).await?;
    User::delete_by_id(user_model.id).exec(&state.db).await?;

    Ok((
        clear_refresh_cookie(jar),
        ApiResponse::success(MessageResponse {
            message: "Account deleted successfully".to_string(),
        }),
    ))
}
