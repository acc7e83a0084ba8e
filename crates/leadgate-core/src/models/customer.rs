use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Customer entity — a converted lead with KYC-style detail fields.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Lead this customer was converted from, if any
    pub lead_id: Option<i32>,

    pub name: String,
    pub email: String,
    pub phone: String,

    /// "Individual" or "Business"
    pub applicant_type: Option<String>,

    /// Proprietorship, Partnership, LLP, ...
    pub entity_type: Option<String>,

    pub pan: Option<String>,
    pub gstin: Option<String>,
    pub cin: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,

    pub contact_person: Option<String>,
    pub designation: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
