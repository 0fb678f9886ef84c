use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::repository::StorageError;

/// Fetch a document body by key, `None` when absent.
pub(super) async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, StorageError> {
    let row = sqlx::query("SELECT body FROM documents WHERE key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    row.map(|row| {
        row.try_get::<String, _>("body")
            .map_err(|e| StorageError::Serialization(e.to_string()))
    })
    .transpose()
}

/// Insert or replace a document body.
pub(super) async fn put(pool: &SqlitePool, key: &str, body: &str) -> Result<(), StorageError> {
    sqlx::query(
        r"
            INSERT INTO documents (key, body, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
        ",
    )
    .bind(key)
    .bind(body)
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| StorageError::Connection(e.to_string()))?;

    Ok(())
}

/// Remove a document; removing an absent key is not an error.
pub(super) async fn delete(pool: &SqlitePool, key: &str) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM documents WHERE key = ?1")
        .bind(key)
        .execute(pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    Ok(())
}
