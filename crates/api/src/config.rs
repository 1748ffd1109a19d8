//! Environment-based configuration.

use std::path::PathBuf;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
}

impl AppConfig {
    /// Load from environment variables, with dev fallbacks.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("STOCKDESK_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("STOCKDESK_JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let bind_addr =
            std::env::var("STOCKDESK_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let upload_dir = std::env::var("STOCKDESK_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("stockdesk-uploads"));

        Self {
            bind_addr,
            jwt_secret,
            upload_dir,
        }
    }
}
