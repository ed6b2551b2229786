//! Repository for the local key/value mirror of the chapter document

use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// Get the raw value stored under a key
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT value
        FROM local_storage
        WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to read local storage key '{}'", key))?;

    Ok(row.map(|(value,)| value))
}

/// Store a value and bump the key's revision, returning the new revision
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<i64> {
    let (revision,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO local_storage (key, value, revision, updated_at)
        VALUES (?, ?, 1, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            revision = local_storage.revision + 1,
            updated_at = CURRENT_TIMESTAMP
        RETURNING revision
        "#,
    )
    .bind(key)
    .bind(value)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Failed to write local storage key '{}'", key))?;

    log::debug!("local_storage['{}'] now at revision {}", key, revision);
    Ok(revision)
}

/// Current revision of a key, 0 when the key is absent
pub async fn revision(pool: &SqlitePool, key: &str) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT revision FROM local_storage WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to read revision of '{}'", key))?;

    Ok(row.map_or(0, |(revision,)| revision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db;

    async fn pool() -> SqlitePool {
        let pool = db::connect_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_revision_bumps_on_every_write() {
        let pool = pool().await;
        assert_eq!(revision(&pool, "CHAPITRES").await.unwrap(), 0);

        assert_eq!(set(&pool, "CHAPITRES", "[]").await.unwrap(), 1);
        assert_eq!(set(&pool, "CHAPITRES", "[]").await.unwrap(), 2);
        assert_eq!(revision(&pool, "CHAPITRES").await.unwrap(), 2);
        assert_eq!(get(&pool, "CHAPITRES").await.unwrap().as_deref(), Some("[]"));
    }
}
