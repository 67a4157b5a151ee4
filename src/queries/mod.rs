//! Database access helpers, one module per entity

pub mod rating;
pub mod store;
pub mod user;
