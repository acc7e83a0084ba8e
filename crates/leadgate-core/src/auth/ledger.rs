//! Durable record of issued refresh tokens.
//!
//! The codec signature bounds a refresh token's natural lifetime; the ledger
//! is what makes early revocation possible. Lookups treat a deleted row and
//! a revoked row identically, which is why the sweep can delete dead rows
//! without affecting validity checks.

use chrono::NaiveDateTime;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::error::LeadgateError;
use crate::models::refresh_token;

/// Insert a new live ledger row for a freshly issued refresh token.
pub async fn record(
    db: &DatabaseConnection,
    token: &str,
    user_id: i32,
    expires_at: NaiveDateTime,
) -> Result<(), LeadgateError> {
    let model = refresh_token::ActiveModel {
        user_id: Set(user_id),
        token: Set(token.to_string()),
        expires_at: Set(expires_at),
        revoked: Set(false),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    model.insert(db).await?;
    Ok(())
}

/// Point lookup by the unique token string.
pub async fn lookup(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<refresh_token::Model>, LeadgateError> {
    let found = refresh_token::Entity::find()
        .filter(refresh_token::Column::Token.eq(token))
        .one(db)
        .await?;
    Ok(found)
}

/// Mark one token revoked. Idempotent: revoking an unknown or
/// already-revoked token is a no-op, so logout never leaks which token
/// strings exist.
pub async fn revoke(db: &DatabaseConnection, token: &str) -> Result<(), LeadgateError> {
    refresh_token::Entity::update_many()
        .col_expr(refresh_token::Column::Revoked, Expr::value(true))
        .filter(refresh_token::Column::Token.eq(token))
        .exec(db)
        .await?;

    Ok(())
}

/// Atomically consume a live token: flip `revoked` from false to true in a
/// single conditional UPDATE and report whether this call did the flip.
///
/// Concurrent rotations of the same token race here; exactly one caller
/// gets `true`, every other caller observes the row already revoked.
pub async fn consume(db: &DatabaseConnection, token: &str) -> Result<bool, LeadgateError> {
    let res = refresh_token::Entity::update_many()
        .col_expr(refresh_token::Column::Revoked, Expr::value(true))
        .filter(refresh_token::Column::Token.eq(token))
        .filter(refresh_token::Column::Revoked.eq(false))
        .exec(db)
        .await?;

    Ok(res.rows_affected == 1)
}

/// Revoke every non-revoked token of a user (logout-all, password reset,
/// account deletion).
pub async fn revoke_all(db: &DatabaseConnection, user_id: i32) -> Result<(), LeadgateError> {
    refresh_token::Entity::update_many()
        .col_expr(refresh_token::Column::Revoked, Expr::value(true))
        .filter(refresh_token::Column::UserId.eq(user_id))
        .filter(refresh_token::Column::Revoked.eq(false))
        .exec(db)
        .await?;

    Ok(())
}

/// Delete rows that are expired or revoked. Storage reclamation only;
/// returns the number of rows removed.
pub async fn sweep(db: &DatabaseConnection, now: NaiveDateTime) -> Result<u64, LeadgateError> {
    let res = refresh_token::Entity::delete_many()
        .filter(
            Condition::any()
                .add(refresh_token::Column::ExpiresAt.lt(now))
                .add(refresh_token::Column::Revoked.eq(true)),
        )
        .exec(db)
        .await?;

    Ok(res.rows_affected)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::testing::test_db;

    #[tokio::test]
    async fn lookup_finds_recorded_token() {
        let db = test_db().await;
        let expires = Utc::now().naive_utc() + Duration::days(30);

        record(&db, "tok-1", 1, expires).await.unwrap();

        let row = lookup(&db, "tok-1").await.unwrap().unwrap();
        assert_eq!(row.user_id, 1);
        assert!(!row.revoked);
        assert!(lookup(&db, "tok-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_tolerates_unknown_tokens() {
        let db = test_db().await;
        let expires = Utc::now().naive_utc() + Duration::days(30);

        record(&db, "tok-1", 1, expires).await.unwrap();
        revoke(&db, "tok-1").await.unwrap();
        revoke(&db, "tok-1").await.unwrap();
        revoke(&db, "never-issued").await.unwrap();

        assert!(lookup(&db, "tok-1").await.unwrap().unwrap().revoked);
    }

    #[tokio::test]
    async fn consume_flips_exactly_once() {
        let db = test_db().await;
        let expires = Utc::now().naive_utc() + Duration::days(30);

        record(&db, "tok-1", 1, expires).await.unwrap();

        assert!(consume(&db, "tok-1").await.unwrap());
        // Second presentation loses the race by definition.
        assert!(!consume(&db, "tok-1").await.unwrap());
        assert!(!consume(&db, "never-issued").await.unwrap());
    }

    #[tokio::test]
    async fn revoke_all_only_touches_one_user() {
        let db = test_db().await;
        let expires = Utc::now().naive_utc() + Duration::days(30);

        record(&db, "a-1", 1, expires).await.unwrap();
        record(&db, "a-2", 1, expires).await.unwrap();
        record(&db, "b-1", 2, expires).await.unwrap();

        revoke_all(&db, 1).await.unwrap();

        assert!(lookup(&db, "a-1").await.unwrap().unwrap().revoked);
        assert!(lookup(&db, "a-2").await.unwrap().unwrap().revoked);
        assert!(!lookup(&db, "b-1").await.unwrap().unwrap().revoked);
    }

    #[tokio::test]
    async fn sweep_deletes_exactly_the_dead_rows() {
        let db = test_db().await;
        let now = Utc::now().naive_utc();

        record(&db, "live", 1, now + Duration::days(30)).await.unwrap();
        record(&db, "expired", 1, now - Duration::days(1)).await.unwrap();
        record(&db, "revoked", 1, now + Duration::days(30)).await.unwrap();
        revoke(&db, "revoked").await.unwrap();

        let deleted = sweep(&db, now).await.unwrap();

        assert_eq!(deleted, 2);
        assert!(lookup(&db, "live").await.unwrap().is_some());
        assert!(lookup(&db, "expired").await.unwrap().is_none());
        assert!(lookup(&db, "revoked").await.unwrap().is_none());
    }
}
