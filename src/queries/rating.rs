use sqlx::SqlitePool;

use crate::error::AppError;
use crate::model::Rating;

const RATING_COLUMNS: &str = "id, rating, user_id, store_id, created_at, updated_at";

/// Ratings for one store, oldest first. Read-only.
pub async fn list_ratings_for_store(
    pool: &SqlitePool,
    store_id: &str,
) -> Result<Vec<Rating>, AppError> {
    let ratings = sqlx::query_as::<_, Rating>(&format!(
        "SELECT {RATING_COLUMNS} FROM ratings WHERE store_id = ? ORDER BY created_at, id"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(ratings)
}

/// Number of rating rows for one (user, store) pair; the unique index keeps
/// this at most 1
pub async fn count_ratings_for_pair(
    pool: &SqlitePool,
    user_id: &str,
    store_id: &str,
) -> Result<i64, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE user_id = ? AND store_id = ?")
            .bind(user_id)
            .bind(store_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}
