use scribepad_core::leases::{
    DEFAULT_LOCK_TTL_MINS, DEFAULT_SESSION_TTL_MINS, DEFAULT_SWEEP_INTERVAL_SECS,
};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Human-readable name for this server instance. Several named instances
    /// may share one database; the name shows up in logs and health output.
    pub server_name: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Sliding session lease lifetime in minutes (default: `30`).
    pub session_ttl_mins: i64,
    /// Exclusive note lock lifetime in minutes (default: `5`).
    pub lock_ttl_mins: i64,
    /// Interval between reconciliation sweeps in seconds (default: `30`).
    pub sweep_interval_secs: u64,
    /// JWT token configuration (secret, lifetime bound).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default     |
    /// |-------------------------|-------------|
    /// | `HOST`                  | `0.0.0.0`   |
    /// | `PORT`                  | `3000`      |
    /// | `SERVER_NAME`           | `local`     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`        |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`        |
    /// | `SESSION_TTL_MINS`      | `30`        |
    /// | `LOCK_TTL_MINS`         | `5`         |
    /// | `SWEEP_INTERVAL_SECS`   | `30`        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let server_name = std::env::var("SERVER_NAME").unwrap_or_else(|_| "local".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let session_ttl_mins: i64 = std::env::var("SESSION_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_MINS.to_string())
            .parse()
            .expect("SESSION_TTL_MINS must be a valid i64");

        let lock_ttl_mins: i64 = std::env::var("LOCK_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_LOCK_TTL_MINS.to_string())
            .parse()
            .expect("LOCK_TTL_MINS must be a valid i64");

        let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse()
            .expect("SWEEP_INTERVAL_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            server_name,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            session_ttl_mins,
            lock_ttl_mins,
            sweep_interval_secs,
            jwt,
        }
    }
}
