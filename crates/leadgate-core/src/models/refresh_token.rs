use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Refresh-token ledger row.
///
/// The signature on the token string bounds its natural lifetime; this row
/// is what allows revoking it early. A row whose `revoked` flag is set must
/// never validate again, even before `expires_at`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The user who owns this refresh token
    pub user_id: i32,

    /// The signed refresh token string, stored verbatim
    #[sea_orm(unique)]
    pub token: String,

    /// When the token expires
    pub expires_at: NaiveDateTime,

    /// Whether this token has been revoked (consumed by rotation, logout,
    /// logout-all, password reset, or account deletion)
    #[sea_orm(default_value = false)]
    pub revoked: bool,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
