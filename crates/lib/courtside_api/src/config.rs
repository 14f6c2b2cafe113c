//! API server configuration.

/// Default maximum distinct devices per account.
const DEFAULT_DEVICE_LIMIT: i64 = 3;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3200").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Shared secret for verifying the identity provider's tokens.
    pub identity_jwt_secret: String,
    /// Maximum distinct devices per account before the soft block.
    pub device_limit: i64,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                | Default                                   |
    /// |-------------------------|-------------------------------------------|
    /// | `BIND_ADDR`             | `127.0.0.1:3200`                          |
    /// | `DATABASE_URL`          | `postgres://localhost:5432/courtside`     |
    /// | `IDENTITY_JWT_SECRET`   | dev-only placeholder                      |
    /// | `COURTSIDE_DEVICE_LIMIT`| `3`                                       |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3200".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/courtside".into()),
            identity_jwt_secret: std::env::var("IDENTITY_JWT_SECRET")
                .unwrap_or_else(|_| "courtside-identity-dev-secret-change-in-production".into()),
            device_limit: std::env::var("COURTSIDE_DEVICE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DEVICE_LIMIT),
        }
    }
}
