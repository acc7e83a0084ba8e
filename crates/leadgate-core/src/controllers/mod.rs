use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::mailer::Mailer;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub mailer: Arc<Mailer>,
}

pub mod auth;
pub mod customers;
pub mod google;
pub mod leads;
