use std::path::PathBuf;

use mediaboard_core::storage::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_DIR};

use crate::auth::jwt::JwtConfig;

/// Default cap on a whole request body (1 GiB), covering multi-file posts.
const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory uploads are stored under (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Largest accepted single file in bytes (default: 200 MiB).
    pub max_upload_bytes: u64,
    /// Largest accepted request body in bytes (default: 1 GiB).
    pub max_request_bytes: usize,
    /// Whether `POST /auth/register` may create admins (default: `false`).
    pub allow_admin_signup: bool,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: '{raw}'")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `UPLOAD_DIR`           | `uploads`                  |
    /// | `MAX_UPLOAD_BYTES`     | `209715200`                |
    /// | `MAX_REQUEST_BYTES`    | `1073741824`               |
    /// | `ALLOW_ADMIN_SIGNUP`   | `false`                    |
    ///
    /// # Panics
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.into()));
        let max_upload_bytes: u64 = env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES);
        let max_request_bytes: usize = env_or("MAX_REQUEST_BYTES", DEFAULT_MAX_REQUEST_BYTES);
        let allow_admin_signup: bool = env_or("ALLOW_ADMIN_SIGNUP", false);

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            max_upload_bytes,
            max_request_bytes,
            allow_admin_signup,
            jwt,
        }
    }
}
