use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User entity — one row per account, whether created by signup or by the
/// first Google login.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    /// Password hash; `None` for accounts that only ever logged in with
    /// Google. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Google OAuth subject id, set once the account is linked.
    #[sea_orm(unique)]
    pub google_id: Option<String>,

    pub name: String,

    pub is_verified: bool,

    #[serde(skip_serializing)]
    pub verification_token: Option<String>,

    #[serde(skip_serializing)]
    pub reset_token: Option<String>,

    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Public user data (safe to return in API responses).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub is_verified: bool,
    pub created_at: NaiveDateTime,
}

impl From<Model> for UserResponse {
    fn from(user: Model) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}
