//! Registration and login: the only place tokens are issued

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::generate_token;
use crate::error::AppError;
use crate::model::{Role, User};
use crate::password::{hash_password, verify_password};
use crate::queries::user::{NewUser, get_user_by_email, insert_user};
use crate::server::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 50, message = "name must be 3-50 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /auth/register - Create a USER-role account and issue a token
#[tracing::instrument(skip(state, input), fields(email = %input.email))]
pub async fn post_register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<AuthResponse>, AppError> {
    input.validate()?;

    let password_hash = hash_password(&input.password)?;

    let user = insert_user(
        &state.pool,
        NewUser {
            name: input.name,
            email: input.email,
            password_hash,
            address: input.address,
            role: Role::User,
        },
    )
    .await?;

    let token = generate_token(
        &user.id,
        &user.email,
        user.role,
        &state.config.jwt.secret,
        state.config.jwt.expiration_days,
    )?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(AuthResponse { token, user }))
}

/// POST /auth/login - Verify credentials and issue a token
///
/// Unknown email and wrong password both collapse to `Unauthenticated`
/// so the response does not enumerate accounts.
#[tracing::instrument(skip(state, input), fields(email = %input.email))]
pub async fn post_login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse>, AppError> {
    let Some(user) = get_user_by_email(&state.pool, &input.email).await? else {
        tracing::warn!("Failed login attempt: unknown email");
        return Err(AppError::Unauthenticated);
    };

    if !verify_password(&input.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Failed login attempt: wrong password");
        return Err(AppError::Unauthenticated);
    }

    let token = generate_token(
        &user.id,
        &user.email,
        user.role,
        &state.config.jwt.secret,
        state.config.jwt.expiration_days,
    )?;

    Ok(Json(AuthResponse { token, user }))
}
