use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://leadgate.db, postgres://...)
    pub database_url: String,

    /// Signing secret for short-lived access tokens.
    ///
    /// Distinct from the refresh secret: a leaked access secret cannot be
    /// used to mint refresh tokens, and vice versa.
    pub jwt_access_secret: String,

    /// Signing secret for long-lived refresh tokens.
    pub jwt_refresh_secret: String,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 4000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Base URL of the React front-end, used for CORS, OAuth redirects and
    /// email links (default: http://localhost:3000)
    pub frontend_url: String,

    /// Google OAuth client ID (optional; Google login disabled if unset)
    pub google_client_id: Option<String>,

    /// Google OAuth client secret
    pub google_client_secret: Option<String>,

    /// Google OAuth redirect URL (the /api/auth/google/callback endpoint)
    pub google_redirect_url: Option<String>,

    /// SMTP relay host (optional; emails are logged instead when unset)
    pub smtp_host: Option<String>,

    /// SMTP relay port (default: 587)
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_user: Option<String>,

    /// SMTP password
    pub smtp_pass: Option<String>,

    /// From address for outbound email
    pub smtp_from: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://leadgate.db?mode=rwc".to_string()),
            jwt_access_secret: std::env::var("JWT_ACCESS_SECRET")
                .unwrap_or_else(|_| "leadgate-dev-access-secret-change-me".to_string()),
            jwt_refresh_secret: std::env::var("JWT_REFRESH_SECRET")
                .unwrap_or_else(|_| "leadgate-dev-refresh-secret-change-me".to_string()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .unwrap_or(4000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            google_redirect_url: std::env::var("GOOGLE_REDIRECT_URL").ok(),
            smtp_host: std::env::var("SMTP_HOST").ok(),
            smtp_port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_pass: std::env::var("SMTP_PASS").ok(),
            smtp_from: std::env::var("SMTP_FROM").ok(),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Check if Google OAuth is fully configured.
    pub fn has_google_oauth(&self) -> bool {
        self.google_client_id.is_some()
            && self.google_client_secret.is_some()
            && self.google_redirect_url.is_some()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
