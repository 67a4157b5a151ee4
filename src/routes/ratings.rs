//! Rating submission and deletion

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::access_control::{Action, authorize};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::model::Rating;
use crate::ratings;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRatingInput {
    pub store_id: String,
    pub rating: i64,
    /// Optional; when present it must match the caller. Nobody rates on
    /// behalf of someone else.
    pub user_id: Option<String>,
}

/// POST /ratings - Create or update the caller's rating for a store
#[tracing::instrument(skip(state, caller, input), fields(caller_id = %caller.user_id))]
pub async fn post_rating(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitRatingInput>,
) -> Result<Json<Rating>, AppError> {
    let target_user_id = input.user_id.as_deref().unwrap_or(&caller.user_id);

    authorize(
        &caller,
        Action::SubmitRating {
            rating_user_id: target_user_id,
        },
    )?;

    let rating =
        ratings::submit_rating(&state.pool, target_user_id, &input.store_id, input.rating).await?;

    Ok(Json(rating))
}

/// DELETE /ratings/{id} - Remove a rating (owner or admin)
#[tracing::instrument(skip(state, caller), fields(caller_id = %caller.user_id))]
pub async fn delete_rating(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(rating_id): Path<String>,
) -> Result<StatusCode, AppError> {
    ratings::delete_rating(&state.pool, &rating_id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
