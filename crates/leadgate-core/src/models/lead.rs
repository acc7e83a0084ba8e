use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lead entity. Free-text CRM fields, passed through as-is.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub company_name: Option<String>,

    pub email: String,
    pub phone: String,

    /// Where the lead came from (referral, website, campaign, ...)
    pub source: Option<String>,

    /// Pipeline status (new, contacted, qualified, won, lost, ...)
    pub status: String,

    pub service: Option<String>,
    pub lead_type: Option<String>,
    pub priority: Option<String>,

    #[sea_orm(column_type = "Double", nullable)]
    pub deal_value: Option<f64>,

    /// Relationship manager the lead is assigned to
    pub assigned_rm: Option<String>,

    pub notes: Option<String>,

    /// User that created the lead
    pub created_by: i32,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
