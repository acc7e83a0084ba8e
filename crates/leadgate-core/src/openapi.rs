use utoipa::OpenApi;

use crate::controllers::auth::{
    AuthResponse, LoginRequest, MessageResponse, PasswordResetRequestPayload, RefreshResponse,
    ResetPasswordRequest, SignupRequest, SignupResponse,
};
use crate::models::user::UserResponse;
use crate::models::{customer, lead};

/// Auto-generated OpenAPI documentation for leadgate.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leadgate API",
        version = "0.1.0",
        description = "Lead-management backend with token-rotation authentication."
    ),
    paths(
        crate::controllers::auth::signup,
        crate::controllers::auth::login,
        crate::controllers::auth::refresh,
        crate::controllers::auth::logout,
        crate::controllers::auth::logout_all,
        crate::controllers::auth::verify_email,
        crate::controllers::auth::request_password_reset,
        crate::controllers::auth::reset_password,
        crate::controllers::auth::profile,
        crate::controllers::auth::delete_account,
        crate::controllers::google::google_auth,
        crate::controllers::google::google_callback,
        crate::controllers::leads::list_leads,
        crate::controllers::leads::create_lead,
        crate::controllers::leads::get_lead,
        crate::controllers::leads::update_lead,
        crate::controllers::leads::delete_lead,
        crate::controllers::customers::list_customers,
        crate::controllers::customers::create_customer,
        crate::controllers::customers::get_customer,
        crate::controllers::customers::update_customer,
        crate::controllers::customers::delete_customer,
    ),
    components(
        schemas(
            SignupRequest,
            SignupResponse,
            LoginRequest,
            AuthResponse,
            RefreshResponse,
            PasswordResetRequestPayload,
            ResetPasswordRequest,
            MessageResponse,
            UserResponse,
            lead::Model,
            customer::Model,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and session endpoints"),
        (name = "leads", description = "Lead CRUD"),
        (name = "customers", description = "Customer CRUD")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
