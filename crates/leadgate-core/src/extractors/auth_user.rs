use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{self, VerifyError};
use crate::config::Config;
use crate::error::LeadgateError;

/// Extractor that authenticates the request's bearer access token.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(user: AuthUser) -> impl IntoResponse {
///     // user.user_id / user.email from the verified claims
/// }
/// ```
///
/// Responses are split so clients know what to do next: a missing token and
/// an expired token are 401 (present or refresh credentials), anything else
/// is 403 (reauthenticate).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = LeadgateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(LeadgateError::AccessTokenRequired)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(LeadgateError::AccessTokenRequired)?;

        // Arc<Config> is installed as a request extension by the app router.
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .ok_or_else(|| LeadgateError::Internal("Config not found in request".to_string()))?;

        let claims =
            auth::verify_token(token, &config.jwt_access_secret).map_err(|e| match e {
                VerifyError::Expired => LeadgateError::AccessTokenExpired,
                VerifyError::Invalid => LeadgateError::InvalidAccessToken,
            })?;

        let user_id = claims.user_id().ok_or(LeadgateError::InvalidAccessToken)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}
