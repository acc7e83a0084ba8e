use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::LeadgateError;

/// Access-token lifetime: short enough that a stolen one goes stale fast.
pub const ACCESS_TOKEN_TTL_MINS: i64 = 15;

/// Refresh-token lifetime. Matches the max-age of the refresh cookie.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// JWT claims payload. Both token classes carry the same claims; what
/// differs is the signing secret and the lifetime.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Account email at issuance time
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Random token id. HMAC signing is deterministic, so without this two
    /// tokens minted for the same identity in the same second would be
    /// byte-identical — colliding on the ledger's unique index and
    /// defeating rotation's different-string guarantee.
    pub jti: String,
}

impl Claims {
    /// The user id carried in `sub`, if it parses.
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Why verification rejected a token.
///
/// `Expired` is only returned for a well-formed, correctly signed token
/// whose `exp` has passed; everything else (bad signature, wrong secret,
/// malformed structure) is `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    Expired,
    Invalid,
}

/// Sign a token for the given identity with an explicit lifetime.
///
/// Public so tests can mint already-expired tokens; application code goes
/// through [`issue_access_token`] and [`issue_refresh_token`].
pub fn issue_token(
    user_id: i32,
    email: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, LeadgateError> {
    let now = Utc::now();
    let expires = now + ttl;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expires.timestamp() as usize,
        iat: now.timestamp() as usize,
        jti: hex::encode(rand::random::<[u8; 16]>()),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| LeadgateError::Internal(format!("Failed to sign token: {}", e)))
}

/// Sign a 15-minute access token with the access secret.
pub fn issue_access_token(
    user_id: i32,
    email: &str,
    secret: &str,
) -> Result<String, LeadgateError> {
    issue_token(user_id, email, secret, Duration::minutes(ACCESS_TOKEN_TTL_MINS))
}

/// Sign a 30-day refresh token with the refresh secret.
pub fn issue_refresh_token(
    user_id: i32,
    email: &str,
    secret: &str,
) -> Result<String, LeadgateError> {
    issue_token(user_id, email, secret, Duration::days(REFRESH_TOKEN_TTL_DAYS))
}

/// Verify a token against the given secret and return its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, VerifyError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => VerifyError::Expired,
        _ => VerifyError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "unit-test-access-secret";
    const REFRESH_SECRET: &str = "unit-test-refresh-secret";

    #[test]
    fn round_trips_identity_claims() {
        let token = issue_access_token(42, "a@x.com", ACCESS_SECRET).unwrap();
        let claims = verify_token(&token, ACCESS_SECRET).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_wrong_secret_as_invalid() {
        let token = issue_access_token(1, "a@x.com", ACCESS_SECRET).unwrap();
        assert_eq!(
            verify_token(&token, "some-other-secret").unwrap_err(),
            VerifyError::Invalid
        );
    }

    #[test]
    fn access_and_refresh_secrets_are_not_interchangeable() {
        let access = issue_access_token(1, "a@x.com", ACCESS_SECRET).unwrap();
        let refresh = issue_refresh_token(1, "a@x.com", REFRESH_SECRET).unwrap();

        assert!(verify_token(&access, REFRESH_SECRET).is_err());
        assert!(verify_token(&refresh, ACCESS_SECRET).is_err());
    }

    #[test]
    fn rejects_expired_token_as_expired() {
        // Past the default validation leeway.
        let token = issue_token(1, "a@x.com", ACCESS_SECRET, Duration::minutes(-5)).unwrap();
        assert_eq!(
            verify_token(&token, ACCESS_SECRET).unwrap_err(),
            VerifyError::Expired
        );
    }

    #[test]
    fn tokens_minted_in_the_same_instant_differ() {
        let a = issue_refresh_token(1, "a@x.com", REFRESH_SECRET).unwrap();
        let b = issue_refresh_token(1, "a@x.com", REFRESH_SECRET).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_garbage_as_invalid() {
        assert_eq!(
            verify_token("not-even-a-jwt", ACCESS_SECRET).unwrap_err(),
            VerifyError::Invalid
        );
    }
}
