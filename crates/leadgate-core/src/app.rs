use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::ledger;
use crate::config::Config;
use crate::controllers::auth::MessageResponse;
use crate::controllers::{self, AppState};
use crate::error::LeadgateError;
use crate::mailer::Mailer;
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;
use crate::response::ApiResponse;

/// How often the ledger sweep reclaims expired and revoked rows.
pub const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// The leadgate application.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    mailer: Arc<Mailer>,
}

impl App {
    /// Create the application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create the application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        // Run pending migrations automatically on startup
        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        let mailer = Arc::new(Mailer::from_config(&config));

        Ok(App { config, db, mailer })
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let config = Arc::new(self.config.clone());
        let is_dev = self.config.is_dev();

        let state = AppState {
            db: self.db.clone(),
            config: config.clone(),
            mailer: self.mailer.clone(),
        };

        // The refresh cookie needs credentialed CORS against the one
        // front-end origin; a wildcard would be rejected by browsers.
        let cors = match self.config.frontend_url.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
            Err(_) => CorsLayer::permissive(),
        };

        let api = Router::new()
            .nest(
                "/api/auth",
                controllers::auth::routes().merge(controllers::google::routes()),
            )
            .nest(
                "/api",
                controllers::leads::routes().merge(controllers::customers::routes()),
            )
            .with_state(state);

        let mut router = Router::new()
            .route("/health", get(health))
            .merge(api)
            .merge(Scalar::with_url("/api-docs", ApiDoc::openapi()))
            .route(
                "/api-docs/openapi.json",
                get(|| async { axum::Json(ApiDoc::openapi()) }),
            )
            .fallback(not_found)
            .layer(axum::Extension(config))
            .layer(cors);

        // Only add expensive tracing/request-id middleware in development mode.
        if is_dev {
            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the application server until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();

        Self::spawn_token_sweeper(self.db.clone());

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("leadgate server running on http://{}", addr);
        tracing::info!("API docs at http://{}/api-docs", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Periodic ledger sweep. Runs concurrently with request serving; it
    /// only deletes rows that are already logically invalid.
    fn spawn_token_sweeper(db: DatabaseConnection) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                match ledger::sweep(&db, Utc::now().naive_utc()).await {
                    Ok(removed) if removed > 0 => {
                        tracing::info!(removed, "swept dead refresh tokens");
                    }
                    Ok(_) => tracing::debug!("token sweep: nothing to remove"),
                    Err(e) => tracing::warn!(error = %e, "token sweep failed"),
                }
            }
        });
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down leadgate server...");
}

/// Liveness probe at `/health`.
async fn health() -> ApiResponse<MessageResponse> {
    ApiResponse::success(MessageResponse {
        message: "Server is running".to_string(),
    })
}

async fn not_found() -> impl IntoResponse {
    LeadgateError::NotFound("Route not found".to_string())
}
