//! Session lifecycle: login, refresh rotation, logout, mass revocation.
//!
//! A refresh token is Live from the ledger's point of view until it is
//! consumed by rotation, revoked by logout / logout-all, or passes its
//! expiry. Only a Live token can be redeemed, and redeeming it is what
//! kills it — a second presentation of the same string is the signal that
//! someone replayed it.

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::{jwt, ledger};
use crate::config::Config;
use crate::error::LeadgateError;
use crate::models::user::{self, Entity as User};

/// One access/refresh pair, as handed to the HTTP layer. The refresh token
/// travels in an HTTP-only cookie, never in a response body.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign a fresh pair for the given identity and record the refresh token in
/// the ledger.
pub async fn issue_token_pair(
    db: &DatabaseConnection,
    config: &Config,
    user_id: i32,
    email: &str,
) -> Result<TokenPair, LeadgateError> {
    let access_token = jwt::issue_access_token(user_id, email, &config.jwt_access_secret)?;
    let refresh_token = jwt::issue_refresh_token(user_id, email, &config.jwt_refresh_secret)?;

    let expires_at = Utc::now().naive_utc() + Duration::days(jwt::REFRESH_TOKEN_TTL_DAYS);
    ledger::record(db, &refresh_token, user_id, expires_at).await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Password login.
///
/// A missing account, an OAuth-only account (no password hash), and a wrong
/// password all collapse into the same `InvalidCredentials` so the response
/// cannot be used to enumerate accounts.
pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<(user::Model, TokenPair), LeadgateError> {
    let user_model = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or(LeadgateError::InvalidCredentials)?;

    let hash = user_model
        .password_hash
        .as_deref()
        .ok_or(LeadgateError::InvalidCredentials)?;

    if !super::password::verify_password(password, hash)? {
        return Err(LeadgateError::InvalidCredentials);
    }

    let pair = issue_token_pair(db, config, user_model.id, &user_model.email).await?;
    Ok((user_model, pair))
}

/// Resolve a Google identity to a local account, creating or linking as
/// needed.
///
/// Upsert keyed first on the Google subject id, falling back to email: an
/// existing password account with the same address is linked (google_id
/// attached, marked verified — Google already verified the address) rather
/// than duplicated. The caller issues the token pair directly; there is no
/// password step on this path.
pub async fn resolve_google_user(
    db: &DatabaseConnection,
    google_id: &str,
    email: &str,
    name: &str,
) -> Result<user::Model, LeadgateError> {
    if let Some(existing) = User::find()
        .filter(user::Column::GoogleId.eq(google_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    if let Some(by_email) = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
    {
        let mut active: user::ActiveModel = by_email.into();
        active.google_id = Set(Some(google_id.to_string()));
        active.is_verified = Set(true);
        active.updated_at = Set(Utc::now().naive_utc());
        return Ok(active.update(db).await?);
    }

    let now = Utc::now().naive_utc();
    let created = user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(None),
        google_id: Set(Some(google_id.to_string())),
        name: Set(name.to_string()),
        is_verified: Set(true),
        verification_token: Set(None),
        reset_token: Set(None),
        reset_token_expiry: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(created)
}

/// Redeem a refresh token for a fresh pair, consuming it.
///
/// The presented token is revoked before the replacement is minted, so a
/// crash partway through costs the user a login but never leaves two valid
/// copies. Concurrent presentations of the same string race on the
/// ledger's conditional update; the loser sees `RefreshInvalid`.
pub async fn rotate_refresh_token(
    db: &DatabaseConnection,
    config: &Config,
    presented: &str,
) -> Result<TokenPair, LeadgateError> {
    let claims = jwt::verify_token(presented, &config.jwt_refresh_secret)
        .map_err(|_| LeadgateError::RefreshInvalid)?;

    // Reuse detection: absent or already-revoked means this string was
    // either never issued or has already been redeemed once.
    let record = ledger::lookup(db, presented)
        .await?
        .ok_or(LeadgateError::RefreshInvalid)?;
    if record.revoked {
        return Err(LeadgateError::RefreshInvalid);
    }

    if record.expires_at < Utc::now().naive_utc() {
        ledger::revoke(db, presented).await?;
        return Err(LeadgateError::RefreshExpired);
    }

    // Consume before minting; the conditional update closes the race with
    // a concurrent rotation of the same token.
    if !ledger::consume(db, presented).await? {
        return Err(LeadgateError::RefreshInvalid);
    }

    let user_id = claims.user_id().ok_or(LeadgateError::RefreshInvalid)?;
    issue_token_pair(db, config, user_id, &claims.email).await
}

/// Revoke a single refresh token. Always succeeds, even for unknown or
/// already-revoked tokens.
pub async fn logout(db: &DatabaseConnection, refresh_token: &str) -> Result<(), LeadgateError> {
    ledger::revoke(db, refresh_token).await
}

/// Revoke every live session of a user. Used for "log out everywhere" and
/// unconditionally on password reset and account deletion.
pub async fn logout_all(db: &DatabaseConnection, user_id: i32) -> Result<(), LeadgateError> {
    ledger::revoke_all(db, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password;
    use crate::testing::{test_config, test_db};

    async fn seed_user(
        db: &DatabaseConnection,
        email: &str,
        password_hash: Option<String>,
        google_id: Option<String>,
    ) -> user::Model {
        let now = Utc::now().naive_utc();
        user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            google_id: Set(google_id),
            name: Set("Test User".to_string()),
            is_verified: Set(true),
            verification_token: Set(None),
            reset_token: Set(None),
            reset_token_expiry: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn login_succeeds_and_access_token_carries_identity() {
        let db = test_db().await;
        let config = test_config();
        let hash = password::hash_password("Secret123!").unwrap();
        let seeded = seed_user(&db, "a@x.com", Some(hash), None).await;

        let (user_model, pair) = login(&db, &config, "a@x.com", "Secret123!").await.unwrap();

        assert_eq!(user_model.id, seeded.id);
        let claims = jwt::verify_token(&pair.access_token, &config.jwt_access_secret).unwrap();
        assert_eq!(claims.user_id(), Some(seeded.id));
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let db = test_db().await;
        let config = test_config();
        let hash = password::hash_password("Secret123!").unwrap();
        seed_user(&db, "a@x.com", Some(hash), None).await;
        seed_user(&db, "oauth@x.com", None, Some("goog-1".to_string())).await;

        // No such user, wrong password, OAuth-only account: same error.
        for (email, pw) in [
            ("nobody@x.com", "Secret123!"),
            ("a@x.com", "wrong"),
            ("oauth@x.com", "Secret123!"),
        ] {
            let err = login(&db, &config, email, pw).await.unwrap_err();
            assert!(matches!(err, LeadgateError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn rotation_is_single_use() {
        let db = test_db().await;
        let config = test_config();
        let pair = issue_token_pair(&db, &config, 7, "a@x.com").await.unwrap();

        let rotated = rotate_refresh_token(&db, &config, &pair.refresh_token)
            .await
            .unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // The consumed token is revoked in the ledger and a replay fails.
        let old_row = ledger::lookup(&db, &pair.refresh_token)
            .await
            .unwrap()
            .unwrap();
        assert!(old_row.revoked);

        let err = rotate_refresh_token(&db, &config, &pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(err, LeadgateError::RefreshInvalid));

        // The replacement still works.
        rotate_refresh_token(&db, &config, &rotated.refresh_token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rotation_rejects_unrecorded_and_tampered_tokens() {
        let db = test_db().await;
        let config = test_config();

        // Correctly signed but never recorded (e.g. ledger row swept).
        let unrecorded =
            jwt::issue_refresh_token(7, "a@x.com", &config.jwt_refresh_secret).unwrap();
        let err = rotate_refresh_token(&db, &config, &unrecorded)
            .await
            .unwrap_err();
        assert!(matches!(err, LeadgateError::RefreshInvalid));

        // Signed with the wrong secret.
        let forged = jwt::issue_refresh_token(7, "a@x.com", "attacker-secret").unwrap();
        let err = rotate_refresh_token(&db, &config, &forged).await.unwrap_err();
        assert!(matches!(err, LeadgateError::RefreshInvalid));
    }

    #[tokio::test]
    async fn ledger_expiry_revokes_and_reports_expired() {
        let db = test_db().await;
        let config = test_config();

        // Signature still valid, but the ledger row has lapsed.
        let token = jwt::issue_refresh_token(7, "a@x.com", &config.jwt_refresh_secret).unwrap();
        ledger::record(&db, &token, 7, Utc::now().naive_utc() - Duration::hours(1))
            .await
            .unwrap();

        let err = rotate_refresh_token(&db, &config, &token).await.unwrap_err();
        assert!(matches!(err, LeadgateError::RefreshExpired));
        assert!(ledger::lookup(&db, &token).await.unwrap().unwrap().revoked);
    }

    #[tokio::test]
    async fn logout_all_kills_every_outstanding_refresh_token() {
        let db = test_db().await;
        let config = test_config();
        let first = issue_token_pair(&db, &config, 7, "a@x.com").await.unwrap();
        let second = issue_token_pair(&db, &config, 7, "a@x.com").await.unwrap();

        logout_all(&db, 7).await.unwrap();

        for token in [&first.refresh_token, &second.refresh_token] {
            let err = rotate_refresh_token(&db, &config, token).await.unwrap_err();
            assert!(matches!(err, LeadgateError::RefreshInvalid));
        }
    }

    #[tokio::test]
    async fn logout_tolerates_unknown_tokens() {
        let db = test_db().await;
        logout(&db, "never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn google_resolve_links_by_email_instead_of_duplicating() {
        let db = test_db().await;
        let hash = password::hash_password("Secret123!").unwrap();
        let seeded = seed_user(&db, "a@x.com", Some(hash), None).await;

        let resolved = resolve_google_user(&db, "goog-sub-1", "a@x.com", "A")
            .await
            .unwrap();

        assert_eq!(resolved.id, seeded.id);
        assert_eq!(resolved.google_id.as_deref(), Some("goog-sub-1"));
        assert!(resolved.is_verified);
        assert_eq!(User::find().all(&db).await.unwrap().len(), 1);

        // Second callback resolves by provider id without touching email.
        let again = resolve_google_user(&db, "goog-sub-1", "changed@x.com", "A")
            .await
            .unwrap();
        assert_eq!(again.id, seeded.id);
    }

    #[tokio::test]
    async fn google_resolve_creates_verified_passwordless_account() {
        let db = test_db().await;

        let created = resolve_google_user(&db, "goog-sub-2", "new@x.com", "New User")
            .await
            .unwrap();

        assert!(created.is_verified);
        assert!(created.password_hash.is_none());
        assert_eq!(created.google_id.as_deref(), Some("goog-sub-2"));
    }
}
