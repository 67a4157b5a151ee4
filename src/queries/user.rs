use sqlx::SqlitePool;
use ulid::Ulid;

use crate::error::AppError;
use crate::model::{Role, User, unix_now};
use crate::ratings::recompute_average;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: Option<String>,
    pub role: Role,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, address, role, created_at";

/// Insert a user, surfacing a duplicate email as `Conflict`
pub async fn insert_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, AppError> {
    let user = User {
        id: Ulid::new().to_string(),
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        address: new_user.address,
        role: new_user.role,
        created_at: unix_now(),
    };

    let result = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, address, role, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.address)
    .bind(user.role)
    .bind(user.created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(user),
        Err(e) if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) => Err(
            AppError::Conflict(format!("email {} is already registered", user.email)),
        ),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Delete a user and their ratings
///
/// The rating rows go with the user (FK cascade), so every store they had
/// rated gets its average recomputed inside the same transaction.
pub async fn delete_user(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let affected_stores: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT store_id FROM ratings WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("user {user_id} not found")));
    }

    for (store_id,) in &affected_stores {
        // Stores owned by the deleted user cascade away with them
        let store_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stores WHERE id = ?)")
                .bind(store_id)
                .fetch_one(&mut *tx)
                .await?;
        if store_exists {
            recompute_average(&mut tx, store_id).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(user_id, "User deleted");

    Ok(())
}
