//! Google OAuth login.
//!
//! The transport here is deliberately thin: the interesting decision —
//! which local account a Google identity maps to — lives in
//! [`session::resolve_google_user`]. Once resolved, token issuance is the
//! same as after a password login, minus the password step.

use axum::{
    Router,
    extract::{Query, State},
    response::Redirect,
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::Deserialize;

use crate::auth::session::{self, TokenPair};
use crate::error::LeadgateError;

use super::AppState;
use super::auth::refresh_cookie;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Short-lived cookie carrying the CSRF state between redirect and callback.
const OAUTH_STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/google", get(google_auth))
        .route("/google/callback", get(google_callback))
}

type OauthClient = BasicClient<
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

fn oauth_client(state: &AppState) -> Result<OauthClient, LeadgateError> {
    let config = &state.config;
    let (Some(client_id), Some(client_secret), Some(redirect_url)) = (
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_url.clone(),
    ) else {
        return Err(LeadgateError::BadRequest(
            "Google OAuth is not configured".to_string(),
        ));
    };

    let client = BasicClient::new(ClientId::new(client_id))
        .set_client_secret(ClientSecret::new(client_secret))
        .set_auth_uri(
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|e| LeadgateError::Internal(format!("Invalid auth URL: {}", e)))?,
        )
        .set_token_uri(
            TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                .map_err(|e| LeadgateError::Internal(format!("Invalid token URL: {}", e)))?,
        )
        .set_redirect_uri(
            RedirectUrl::new(redirect_url)
                .map_err(|e| LeadgateError::Internal(format!("Invalid redirect URL: {}", e)))?,
        );

    Ok(client)
}

/// Kick off the consent-screen redirect.
#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses(
        (status = 303, description = "Redirect to Google's consent screen"),
        (status = 400, description = "Google OAuth not configured")
    ),
    tag = "auth"
)]
async fn google_auth(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), LeadgateError> {
    let client = oauth_client(&state)?;

    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new("openid".to_string()))
        .add_scope(Scope::new("email".to_string()))
        .add_scope(Scope::new("profile".to_string()))
        .url();

    // Lax, not Strict: the callback arrives on a cross-site redirect.
    let state_cookie = Cookie::build((OAUTH_STATE_COOKIE, csrf_token.secret().clone()))
        .path("/")
        .http_only(true)
        .secure(!state.config.is_dev())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(10))
        .build();

    Ok((jar.add(state_cookie), Redirect::to(auth_url.as_str())))
}

/// Handle the consent-screen callback: exchange the code, resolve the
/// account, set the refresh cookie, and bounce back to the front-end.
/// Every failure lands on the front-end login page, not on an API error.
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    responses(
        (status = 303, description = "Redirect to the front-end with an access token")
    ),
    tag = "auth"
)]
async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> (CookieJar, Redirect) {
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build((OAUTH_STATE_COOKIE, "")).path("/").build());

    match complete_google_login(&state, expected_state, query).await {
        Ok(pair) => {
            let jar = jar.add(refresh_cookie(&state.config, pair.refresh_token));
            let target = format!(
                "{}/auth/callback?token={}",
                state.config.frontend_url, pair.access_token
            );
            (jar, Redirect::to(&target))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Google login failed");
            let target = format!(
                "{}/login?error=authentication_failed",
                state.config.frontend_url
            );
            (jar, Redirect::to(&target))
        }
    }
}

async fn complete_google_login(
    state: &AppState,
    expected_state: Option<String>,
    query: CallbackQuery,
) -> Result<TokenPair, LeadgateError> {
    let code = query
        .code
        .ok_or_else(|| LeadgateError::BadRequest("Missing authorization code".to_string()))?;

    match (expected_state, query.state) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => {
            return Err(LeadgateError::BadRequest(
                "OAuth state mismatch".to_string(),
            ));
        }
    }

    let client = oauth_client(state)?;

    let http_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| LeadgateError::Internal(format!("Failed to build HTTP client: {}", e)))?;

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(&http_client)
        .await
        .map_err(|e| LeadgateError::BadRequest(format!("Code exchange failed: {}", e)))?;

    let userinfo: GoogleUserInfo = http_client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(token.access_token().secret())
        .send()
        .await
        .map_err(|e| LeadgateError::Internal(format!("Userinfo request failed: {}", e)))?
        .json()
        .await
        .map_err(|e| LeadgateError::Internal(format!("Userinfo decode failed: {}", e)))?;

    let name = userinfo.name.unwrap_or_else(|| userinfo.email.clone());
    let user_model =
        session::resolve_google_user(&state.db, &userinfo.sub, &userinfo.email, &name).await?;

    session::issue_token_pair(&state.db, &state.config, user_model.id, &user_model.email).await
}
