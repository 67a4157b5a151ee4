//! Axum extractor for the bearer token

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::auth::jwt::{AuthUser, validate_token};
use crate::error::AppError;
use crate::server::AppState;

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthenticated)?;

        let auth = validate_token(bearer.token(), &state.config.jwt.secret)?;

        // Tokens outlive accounts: reject callers whose user row is gone
        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
                .bind(&auth.user_id)
                .fetch_one(&state.pool)
                .await?;

        if !user_exists {
            tracing::warn!(user_id = %auth.user_id, "Token for deleted user rejected");
            return Err(AppError::Unauthenticated);
        }

        Ok(auth)
    }
}
