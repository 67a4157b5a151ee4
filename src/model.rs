//! Row types shared between queries, the rating write path and the handlers.

use serde::{Deserialize, Serialize};

/// Caller role, stored as TEXT and carried inside JWT claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
    StoreOwner,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: i64,
}

/// `average_rating` is derived state. It is written exclusively by the
/// aggregate recomputation in `ratings.rs`, never by a handler.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: String,
    pub average_rating: f64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Rating {
    pub id: String,
    pub rating: i64,
    pub user_id: String,
    pub store_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Current unix timestamp in seconds.
pub fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
