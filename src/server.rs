//! Router construction and the HTTP server

use axum::{
    Router,
    routing::{delete, get, post},
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::Config;
use crate::routes::{
    delete_rating, delete_store, delete_user, get_store_ratings, get_stores, get_users, health,
    post_login, post_rating, post_register, post_store, post_user, ready,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Probes (no auth)
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Auth routes (public, issue tokens)
        .route("/auth/register", post(post_register))
        .route("/auth/login", post(post_login))
        // Stores
        .route("/stores", get(get_stores).post(post_store))
        .route("/stores/{id}", delete(delete_store))
        .route("/stores/{id}/ratings", get(get_store_ratings))
        // Ratings
        .route("/ratings", post(post_rating))
        .route("/ratings/{id}", delete(delete_rating))
        // Admin user management
        .route("/users", get(get_users).post(post_user))
        .route("/users/{id}", delete(delete_user))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the web server
pub async fn serve(config: Config, pool: SqlitePool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState { pool, config };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
