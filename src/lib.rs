pub mod access_control;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod observability;
pub mod password;
pub mod queries;
pub mod ratings;
pub mod routes;
pub mod server;

pub use config::Config;
pub use error::AppError;
pub use server::AppState;

/// Create an app router for testing
///
/// Builds the Axum router with all routes configured against the given
/// pool, useful for integration testing without starting the full server.
pub fn create_app(pool: sqlx::SqlitePool) -> axum::Router {
    let config = Config {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: config::DatabaseConfig {
            url: ":memory:".to_string(),
            max_connections: 1,
        },
        jwt: config::JwtConfig {
            secret: test_jwt_secret().to_string(),
            expiration_days: 7,
        },
        observability: config::ObservabilityConfig::default(),
    };

    server::create_router(AppState { pool, config })
}

/// Secret used by `create_app` so tests can mint their own tokens
pub fn test_jwt_secret() -> &'static str {
    "test_secret_key_minimum_32_characters_long"
}
