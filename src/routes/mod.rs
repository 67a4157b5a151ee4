//! HTTP handlers: authenticate, authorize, delegate
//!
//! Handlers never compute aggregates themselves; every rating mutation goes
//! through `ratings.rs`, which recomputes the affected store's average in
//! the same transaction.

pub mod auth;
pub mod health;
pub mod ratings;
pub mod stores;
pub mod users;

pub use auth::{post_login, post_register};
pub use health::{health, ready};
pub use ratings::{delete_rating, post_rating};
pub use stores::{delete_store, get_store_ratings, get_stores, post_store};
pub use users::{delete_user, get_users, post_user};
