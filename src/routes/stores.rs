//! Store listing and admin store management

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::access_control::{Action, authorize};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::model::{Rating, Store};
use crate::queries::rating::list_ratings_for_store;
use crate::queries::store::{self, NewStore};
use crate::server::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoreInput {
    #[validate(length(min = 3, max = 50, message = "name must be 3-50 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: String,
}

/// GET /stores - Listing with aggregate ratings, any authenticated caller
#[tracing::instrument(skip(state, caller), fields(caller_id = %caller.user_id))]
pub async fn get_stores(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Store>>, AppError> {
    authorize(&caller, Action::ListStores)?;

    let stores = store::list_stores(&state.pool).await?;
    Ok(Json(stores))
}

/// GET /stores/{id}/ratings - Individual ratings, oldest first
///
/// Restricted to admins and the store's owner; plain users see only the
/// aggregate in the listing.
#[tracing::instrument(skip(state, caller), fields(caller_id = %caller.user_id))]
pub async fn get_store_ratings(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<Vec<Rating>>, AppError> {
    let Some(store) = store::get_store(&state.pool, &store_id).await? else {
        return Err(AppError::NotFound(format!("store {store_id} not found")));
    };

    authorize(
        &caller,
        Action::ViewStoreRatings {
            store_owner_id: &store.owner_id,
        },
    )?;

    let ratings = list_ratings_for_store(&state.pool, &store_id).await?;
    Ok(Json(ratings))
}

/// POST /stores - Create a store assigned to a STORE_OWNER (admin only)
#[tracing::instrument(skip(state, caller, input), fields(caller_id = %caller.user_id))]
pub async fn post_store(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateStoreInput>,
) -> Result<(StatusCode, Json<Store>), AppError> {
    authorize(&caller, Action::ManageStores)?;
    input.validate()?;

    let created = store::insert_store(
        &state.pool,
        NewStore {
            name: input.name,
            email: input.email,
            address: input.address,
            owner_id: input.owner_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /stores/{id} - Remove a store and its ratings (admin only)
#[tracing::instrument(skip(state, caller), fields(caller_id = %caller.user_id))]
pub async fn delete_store(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<StatusCode, AppError> {
    authorize(&caller, Action::ManageStores)?;

    store::delete_store(&state.pool, &store_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
