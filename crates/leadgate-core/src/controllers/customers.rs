//! Customer CRUD. Same shape as the lead endpoints.

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
use crate::models::customer::{self, Entity as Customer};
use crate::response::ApiResponse;

use super::AppState;
use super::auth::MessageResponse;

// ── Request types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub lead_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub applicant_type: Option<String>,
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
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub lead_id: Option<i32>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub applicant_type: Option<String>,
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
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
}

// ── Handlers ──

/// List customers, newest first.
#[utoipa::path(
    get,
    path = "/api/customers",
    params(Pagination),
    responses(
        (status = 200, description = "List of customers", body = ApiResponse<Vec<customer::Model>>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
async fn list_customers(
    State(state): State<AppState>,
    _user: AuthUser,
    pagination: Pagination,
) -> Result<ApiResponse<Vec<customer::Model>>, LeadgateError> {
    let p = pagination.clamped();
    let page = p.offset / p.limit;

    let customers = Customer::find()
        .order_by_desc(customer::Column::CreatedAt)
        .paginate(&state.db, p.limit)
        .fetch_page(page)
        .await?;

    Ok(ApiResponse::success(customers))
}

/// Create a customer.
#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Customer created", body = ApiResponse<customer::Model>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
async fn create_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<ApiResponse<customer::Model>, LeadgateError> {
    let now = Utc::now().naive_utc();

    let created = customer::ActiveModel {
        lead_id: Set(payload.lead_id),
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        applicant_type: Set(payload.applicant_type),
        entity_type: Set(payload.entity_type),
        pan: Set(payload.pan),
        gstin: Set(payload.gstin),
        cin: Set(payload.cin),
        address: Set(payload.address),
        city: Set(payload.city),
        pincode: Set(payload.pincode),
        country: Set(payload.country),
        contact_person: Set(payload.contact_person),
        designation: Set(payload.designation),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(ApiResponse::success(created))
}

/// Get a single customer by ID.
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer found", body = ApiResponse<customer::Model>),
        (status = 404, description = "Customer not found")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
async fn get_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<customer::Model>, LeadgateError> {
    let found = Customer::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| LeadgateError::NotFound(format!("Customer with id {} not found", id)))?;

    Ok(ApiResponse::success(found))
}

/// Partially update a customer.
#[utoipa::path(
    patch,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<customer::Model>),
        (status = 404, description = "Customer not found")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
async fn update_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<ApiResponse<customer::Model>, LeadgateError> {
    let found = Customer::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| LeadgateError::NotFound(format!("Customer with id {} not found", id)))?;

    let mut active: customer::ActiveModel = found.into();

    if let Some(v) = payload.lead_id {
        active.lead_id = Set(Some(v));
    }
    if let Some(v) = payload.name {
        active.name = Set(v);
    }
    if let Some(v) = payload.email {
        active.email = Set(v);
    }
    if let Some(v) = payload.phone {
        active.phone = Set(v);
    }
    if let Some(v) = payload.applicant_type {
        active.applicant_type = Set(Some(v));
    }
    if let Some(v) = payload.entity_type {
        active.entity_type = Set(Some(v));
    }
    if let Some(v) = payload.pan {
        active.pan = Set(Some(v));
    }
    if let Some(v) = payload.gstin {
        active.gstin = Set(Some(v));
    }
    if let Some(v) = payload.cin {
        active.cin = Set(Some(v));
    }
    if let Some(v) = payload.address {
        active.address = Set(Some(v));
    }
    if let Some(v) = payload.city {
        active.city = Set(Some(v));
    }
    if let Some(v) = payload.pincode {
        active.pincode = Set(Some(v));
    }
    if let Some(v) = payload.country {
        active.country = Set(Some(v));
    }
    if let Some(v) = payload.contact_person {
        active.contact_person = Set(Some(v));
    }
    if let Some(v) = payload.designation {
        active.designation = Set(Some(v));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let updated = active.update(&state.db).await?;
    Ok(ApiResponse::success(updated))
}

/// Delete a customer.
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted", body = ApiResponse<MessageResponse>),
        (status = 404, description = "Customer not found")
    ),
    tag = "customers",
    security(("bearer_auth" = []))
)]
async fn delete_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<MessageResponse>, LeadgateError> {
    let res = Customer::delete_by_id(id).exec(&state.db).await?;
    if res.rows_affected == 0 {
        return Err(LeadgateError::NotFound(format!(
            "Customer with id {} not found",
            id
        )));
    }

    Ok(ApiResponse::success(MessageResponse {
        message: "Customer deleted successfully".to_string(),
    }))
}
