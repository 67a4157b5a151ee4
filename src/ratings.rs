//! Rating write path and aggregate maintenance
//!
//! Every mutation here runs inside a single transaction that also recomputes
//! the affected store's `average_rating` from a fresh aggregate query. The
//! average is never adjusted incrementally and never observable as stale
//! relative to a committed rating change: if recomputation fails, the whole
//! transaction rolls back.

use sqlx::{Sqlite, SqlitePool, Transaction};
use ulid::Ulid;

use crate::access_control::{Action, authorize};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::model::{Rating, unix_now};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Create or update the caller's rating of a store
///
/// If a rating for (user, store) already exists its value is updated in
/// place; otherwise a row is inserted. An insert that loses the race against
/// a concurrent submission for the same pair is retried once as an update
/// and surfaced as `Conflict` if that also finds no row.
#[tracing::instrument(skip(pool))]
pub async fn submit_rating(
    pool: &SqlitePool,
    user_id: &str,
    store_id: &str,
    value: i64,
) -> Result<Rating, AppError> {
    if !(1..=5).contains(&value) {
        return Err(AppError::Validation(format!(
            "rating must be between 1 and 5, got {value}"
        )));
    }

    let mut tx = pool.begin().await?;

    let store_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stores WHERE id = ?)")
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await?;
    if !store_exists {
        return Err(AppError::NotFound(format!("store {store_id} not found")));
    }

    let now = unix_now();

    let updated =
        sqlx::query("UPDATE ratings SET rating = ?, updated_at = ? WHERE user_id = ? AND store_id = ?")
            .bind(value)
            .bind(now)
            .bind(user_id)
            .bind(store_id)
            .execute(&mut *tx)
            .await?;

    if updated.rows_affected() == 0 {
        let inserted = sqlx::query(
            "INSERT INTO ratings (id, rating, user_id, store_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Ulid::new().to_string())
        .bind(value)
        .bind(user_id)
        .bind(store_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                // Lost the insert race; retry once as an update
                let retried = sqlx::query(
                    "UPDATE ratings SET rating = ?, updated_at = ? WHERE user_id = ? AND store_id = ?",
                )
                .bind(value)
                .bind(now)
                .bind(user_id)
                .bind(store_id)
                .execute(&mut *tx)
                .await?;

                if retried.rows_affected() == 0 {
                    return Err(AppError::Conflict(
                        "concurrent rating submission for the same store".to_string(),
                    ));
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    recompute_average(&mut tx, store_id).await?;

    let rating = sqlx::query_as::<_, Rating>(
        "SELECT id, rating, user_id, store_id, created_at, updated_at
         FROM ratings WHERE user_id = ? AND store_id = ?",
    )
    .bind(user_id)
    .bind(store_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id,
        store_id,
        rating = value,
        "Rating submitted"
    );

    Ok(rating)
}

/// Delete a rating
///
/// Allowed for the rating's owner or an admin. The affected store's average
/// is recomputed in the same transaction as the delete.
#[tracing::instrument(skip(pool, caller), fields(caller_id = %caller.user_id))]
pub async fn delete_rating(
    pool: &SqlitePool,
    rating_id: &str,
    caller: &AuthUser,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let row: Option<(String, String)> =
        sqlx::query_as("SELECT user_id, store_id FROM ratings WHERE id = ?")
            .bind(rating_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((owner_id, store_id)) = row else {
        return Err(AppError::NotFound(format!("rating {rating_id} not found")));
    };

    authorize(caller, Action::DeleteRating { rating_user_id: &owner_id })?;

    sqlx::query("DELETE FROM ratings WHERE id = ?")
        .bind(rating_id)
        .execute(&mut *tx)
        .await?;

    recompute_average(&mut tx, &store_id).await?;

    tx.commit().await?;

    tracing::info!(rating_id, store_id, "Rating deleted");

    Ok(())
}

/// Re-derive one store's `average_rating` from the current rating set
///
/// Runs inside the caller's transaction so the new average commits (or rolls
/// back) together with the triggering mutation. The value is always computed
/// from a fresh COUNT/SUM, which makes the function idempotent and immune to
/// drift under interleaved mutations.
pub(crate) async fn recompute_average(
    tx: &mut Transaction<'_, Sqlite>,
    store_id: &str,
) -> Result<f64, AppError> {
    let (count, sum): (i64, Option<i64>) =
        sqlx::query_as("SELECT COUNT(*), SUM(rating) FROM ratings WHERE store_id = ?")
            .bind(store_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| AppError::AggregateInconsistency(e.to_string()))?;

    let average = if count == 0 {
        0.0
    } else {
        sum.unwrap_or(0) as f64 / count as f64
    };

    let result = sqlx::query("UPDATE stores SET average_rating = ? WHERE id = ?")
        .bind(average)
        .bind(store_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::AggregateInconsistency(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(AppError::AggregateInconsistency(format!(
            "store {store_id} vanished during recomputation"
        )));
    }

    Ok(average)
}

/// Recompute a store's average in its own transaction
///
/// The write path never needs this; it exists for repair tooling and for
/// verifying idempotence.
pub async fn recompute_store_average(pool: &SqlitePool, store_id: &str) -> Result<f64, AppError> {
    let mut tx = pool.begin().await?;
    let average = recompute_average(&mut tx, store_id).await?;
    tx.commit().await?;
    Ok(average)
}
