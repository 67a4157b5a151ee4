//! Centralized access policy
//!
//! Pure decision function over (caller, requested action). Handlers call
//! [`authorize`] after the bearer-token extractor has established identity,
//! so an `Unauthenticated` (401) outcome and a `Forbidden` (403) outcome
//! are always distinct.

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::model::Role;

/// Action requested by a caller, carrying the target needed for
/// ownership checks.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Create, list or delete arbitrary users
    ManageUsers,
    /// Create or delete stores
    ManageStores,
    /// Read the public store listing with aggregates
    ListStores,
    /// Read the individual ratings of one store
    ViewStoreRatings { store_owner_id: &'a str },
    /// Create or update a rating on behalf of `rating_user_id`
    SubmitRating { rating_user_id: &'a str },
    /// Delete the rating owned by `rating_user_id`
    DeleteRating { rating_user_id: &'a str },
}

/// Decide whether `caller` may perform `action`
pub fn authorize(caller: &AuthUser, action: Action<'_>) -> Result<(), AppError> {
    let allowed = match action {
        Action::ManageUsers | Action::ManageStores => caller.role == Role::Admin,
        Action::ListStores => true,
        Action::ViewStoreRatings { store_owner_id } => match caller.role {
            Role::Admin => true,
            Role::StoreOwner => caller.user_id == store_owner_id,
            Role::User => false,
        },
        Action::SubmitRating { rating_user_id } => {
            caller.role == Role::User && caller.user_id == rating_user_id
        }
        Action::DeleteRating { rating_user_id } => {
            caller.role == Role::Admin || caller.user_id == rating_user_id
        }
    };

    if allowed {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %caller.user_id,
            role = ?caller.role,
            action = ?action,
            "Access denied"
        );
        Err(AppError::Forbidden(describe_denial(&action)))
    }
}

fn describe_denial(action: &Action<'_>) -> String {
    match action {
        Action::ManageUsers => "admin role required to manage users".to_string(),
        Action::ManageStores => "admin role required to manage stores".to_string(),
        Action::ListStores => "not allowed to list stores".to_string(),
        Action::ViewStoreRatings { .. } => {
            "only the store owner or an admin may view its ratings".to_string()
        }
        Action::SubmitRating { .. } => {
            "ratings can only be submitted by a USER for themselves".to_string()
        }
        Action::DeleteRating { .. } => {
            "only the rating owner or an admin may delete it".to_string()
        }
    }
}
