//! Admin user management

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
use crate::model::{Role, User};
use crate::password::hash_password;
use crate::queries::user::{self, NewUser};
use crate::server::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 50, message = "name must be 3-50 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub address: Option<String>,
    pub role: Role,
}

/// GET /users - List all users (admin only)
#[tracing::instrument(skip(state, caller), fields(caller_id = %caller.user_id))]
pub async fn get_users(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    authorize(&caller, Action::ManageUsers)?;

    let users = user::list_users(&state.pool).await?;
    Ok(Json(users))
}

/// POST /users - Create a user with any role (admin only)
#[tracing::instrument(skip(state, caller, input), fields(caller_id = %caller.user_id))]
pub async fn post_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), AppError> {
    authorize(&caller, Action::ManageUsers)?;
    input.validate()?;

    let password_hash = hash_password(&input.password)?;

    let created = user::insert_user(
        &state.pool,
        NewUser {
            name: input.name,
            email: input.email,
            password_hash,
            address: input.address,
            role: input.role,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /users/{id} - Remove a user (admin only)
///
/// The user's ratings go with them; affected store averages are recomputed
/// in the delete transaction.
#[tracing::instrument(skip(state, caller), fields(caller_id = %caller.user_id))]
pub async fn delete_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    authorize(&caller, Action::ManageUsers)?;

    user::delete_user(&state.pool, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
