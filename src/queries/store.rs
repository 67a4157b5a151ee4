use sqlx::SqlitePool;
use ulid::Ulid;

use crate::error::AppError;
use crate::model::{Role, Store, unix_now};

pub struct NewStore {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: String,
}

const STORE_COLUMNS: &str = "id, name, email, address, owner_id, average_rating, created_at";

/// Insert a store assigned to a STORE_OWNER
///
/// The owner must exist and carry the STORE_OWNER role; anything else is a
/// validation failure, not a constraint error at commit time.
pub async fn insert_store(pool: &SqlitePool, new_store: NewStore) -> Result<Store, AppError> {
    let owner_role: Option<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
        .bind(&new_store.owner_id)
        .fetch_optional(pool)
        .await?;

    match owner_role {
        None => {
            return Err(AppError::Validation(format!(
                "owner {} does not exist",
                new_store.owner_id
            )));
        }
        Some(role) if role != Role::StoreOwner => {
            return Err(AppError::Validation(format!(
                "owner {} does not have the STORE_OWNER role",
                new_store.owner_id
            )));
        }
        Some(_) => {}
    }

    let store = Store {
        id: Ulid::new().to_string(),
        name: new_store.name,
        email: new_store.email,
        address: new_store.address,
        owner_id: new_store.owner_id,
        average_rating: 0.0,
        created_at: unix_now(),
    };

    sqlx::query(
        "INSERT INTO stores (id, name, email, address, owner_id, average_rating, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&store.id)
    .bind(&store.name)
    .bind(&store.email)
    .bind(&store.address)
    .bind(&store.owner_id)
    .bind(store.average_rating)
    .bind(store.created_at)
    .execute(pool)
    .await?;

    Ok(store)
}

pub async fn get_store(pool: &SqlitePool, store_id: &str) -> Result<Option<Store>, AppError> {
    let store = sqlx::query_as::<_, Store>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE id = ?"
    ))
    .bind(store_id)
    .fetch_optional(pool)
    .await?;

    Ok(store)
}

pub async fn list_stores(pool: &SqlitePool) -> Result<Vec<Store>, AppError> {
    let stores = sqlx::query_as::<_, Store>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;

    Ok(stores)
}

/// Delete a store; its ratings cascade away with it
pub async fn delete_store(pool: &SqlitePool, store_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM stores WHERE id = ?")
        .bind(store_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("store {store_id} not found")));
    }

    tracing::info!(store_id, "Store deleted");

    Ok(())
}
