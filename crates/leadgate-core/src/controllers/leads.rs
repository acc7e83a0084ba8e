//! Lead CRUD. Pass-through to the ORM; no business rules beyond the gate.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::LeadgateError;
use crate::extractors::{AuthUser, Pagination};
use crate::models::lead::{self, Entity as Lead};
use crate::response::ApiResponse;

use super::AppState;
use super::auth::MessageResponse;

// ── Request types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeadRequest {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub phone: String,
    pub source: Option<String>,
    pub status: Option<String>,
    pub service: Option<String>,
    pub lead_type: Option<String>,
    pub priority: Option<String>,
    pub deal_value: Option<f64>,
    pub assigned_rm: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLeadRequest {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub service: Option<String>,
    pub lead_type: Option<String>,
    pub priority: Option<String>,
    pub deal_value: Option<f64>,
    pub assigned_rm: Option<String>,
    pub notes: Option<String>,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads).post(create_lead))
        .route(
            "/leads/{id}",
            get(get_lead).patch(update_lead).delete(delete_lead),
        )
}

// ── Handlers ──

/// List leads, newest first.
#[utoipa::path(
    get,
    path = "/api/leads",
    params(Pagination),
    responses(
        (status = 200, description = "List of leads", body = ApiResponse<Vec<lead::Model>>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "leads",
    security(("bearer_auth" = []))
)]
async fn list_leads(
    State(state): State<AppState>,
    _user: AuthUser,
    pagination: Pagination,
) -> Result<ApiResponse<Vec<lead::Model>>, LeadgateError> {
    let p = pagination.clamped();
    let page = p.offset / p.limit;

    let leads = Lead::find()
        .order_by_desc(lead::Column::CreatedAt)
        .paginate(&state.db, p.limit)
        .fetch_page(page)
        .await?;

    Ok(ApiResponse::success(leads))
}

/// Create a lead.
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 200, description = "Lead created", body = ApiResponse<lead::Model>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "leads",
    security(("bearer_auth" = []))
)]
async fn create_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<ApiResponse<lead::Model>, LeadgateError> {
    let now = Utc::now().naive_utc();

    let created = lead::ActiveModel {
        first_name: Set(payload.first_name),
        middle_name: Set(payload.middle_name),
        last_name: Set(payload.last_name),
        company_name: Set(payload.company_name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        source: Set(payload.source),
        status: Set(payload.status.unwrap_or_else(|| "new".to_string())),
        service: Set(payload.service),
        lead_type: Set(payload.lead_type),
        priority: Set(payload.priority),
        deal_value: Set(payload.deal_value),
        assigned_rm: Set(payload.assigned_rm),
        notes: Set(payload.notes),
        created_by: Set(user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(ApiResponse::success(created))
}

/// Get a single lead by ID.
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead found", body = ApiResponse<lead::Model>),
        (status = 404, description = "Lead not found")
    ),
    tag = "leads",
    security(("bearer_auth" = []))
)]
async fn get_lead(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<lead::Model>, LeadgateError> {
    let found = Lead::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| LeadgateError::NotFound(format!("Lead with id {} not found", id)))?;

    Ok(ApiResponse::success(found))
}

/// Partially update a lead.
#[utoipa::path(
    patch,
    path = "/api/leads/{id}",
    params(("id" = i32, Path, description = "Lead ID")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated", body = ApiResponse<lead::Model>),
        (status = 404, description = "Lead not found")
    ),
    tag = "leads",
    security(("bearer_auth" = []))
)]
async fn update_lead(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateLeadRequest>,
) -> Result<ApiResponse<lead::Model>, LeadgateError> {
    let found = Lead::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| LeadgateError::NotFound(format!("Lead with id {} not found", id)))?;

    let mut active: lead::ActiveModel = found.into();

    if let Some(v) = payload.first_name {
        active.first_name = Set(v);
    }
    if let Some(v) = payload.middle_name {
        active.middle_name = Set(Some(v));
    }
    if let Some(v) = payload.last_name {
        active.last_name = Set(v);
    }
    if let Some(v) = payload.company_name {
        active.company_name = Set(Some(v));
    }
    if let Some(v) = payload.email {
        active.email = Set(v);
    }
    if let Some(v) = payload.phone {
        active.phone = Set(v);
    }
    if let Some(v) = payload.source {
        active.source = Set(Some(v));
    }
    if let Some(v) = payload.status {
        active.status = Set(v);
    }
    if let Some(v) = payload.service {
        active.service = Set(Some(v));
    }
    if let Some(v) = payload.lead_type {
        active.lead_type = Set(Some(v));
    }
    if let Some(v) = payload.priority {
        active.priority = Set(Some(v));
    }
    if let Some(v) = payload.deal_value {
        active.deal_value = Set(Some(v));
    }
    if let Some(v) = payload.assigned_rm {
        active.assigned_rm = Set(Some(v));
    }
    if let Some(v) = payload.notes {
        active.notes = Set(Some(v));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = active.update(&state.db).await?;
    Ok(ApiResponse::success(updated))
}

/// Delete a lead.
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead deleted", body = ApiResponse<MessageResponse>),
        (status = 404, description = "Lead not found")
    ),
    tag = "leads",
    security(("bearer_auth" = []))
)]
async fn delete_lead(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<MessageResponse>, LeadgateError> {
    let res = Lead::delete_by_id(id).exec(&state.db).await?;
    if res.rows_affected == 0 {
        return Err(LeadgateError::NotFound(format!(
            "Lead with id {} not found",
            id
        )));
    }

    Ok(ApiResponse::success(MessageResponse {
        message: "Lead deleted successfully".to_string(),
    }))
}
