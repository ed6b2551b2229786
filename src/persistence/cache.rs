use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::repository::local_storage;
use crate::content::Chapter;
use crate::error::{AdminError, AdminResult};

fn storage_error(error: anyhow::Error) -> AdminError {
    AdminError::Storage(format!("{:#}", error))
}

/// Local mirror of the chapter collection, keyed like browser local storage.
///
/// Clones share one record of the revisions they wrote, so a handle (one
/// session) can tell its own writes from those of other sessions. The record
/// is locked across each write and each observation.
#[derive(Debug, Clone)]
pub struct LocalCache {
    pool: SqlitePool,
    own_writes: Arc<Mutex<HashMap<String, i64>>>,
}

/// A key's revision as seen by one handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observed {
    pub revision: i64,
    /// The latest write to the key came from this handle
    pub own: bool,
}

impl LocalCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            own_writes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn read_chapters(&self, key: &str) -> AdminResult<Option<Vec<Chapter>>> {
        let Some(raw) = local_storage::get(&self.pool, key).await.map_err(storage_error)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AdminError::Storage(format!("cached '{}' is not a chapter list: {}", key, e)))
    }

    pub async fn write_chapters(&self, key: &str, chapters: &[Chapter]) -> AdminResult<i64> {
        let raw = serde_json::to_string(chapters)
            .map_err(|e| AdminError::Storage(format!("could not serialize chapters: {}", e)))?;
        self.write_raw(key, &raw).await
    }

    /// Write raw text under a key, bypassing chapter serialization
    pub async fn write_raw(&self, key: &str, raw: &str) -> AdminResult<i64> {
        let mut own = self.own_writes.lock().await;
        let revision = local_storage::set(&self.pool, key, raw)
            .await
            .map_err(storage_error)?;
        own.insert(key.to_string(), revision);
        Ok(revision)
    }

    pub async fn revision(&self, key: &str) -> AdminResult<i64> {
        local_storage::revision(&self.pool, key)
            .await
            .map_err(storage_error)
    }

    /// Current revision of `key` and whether this handle wrote it
    pub async fn observe(&self, key: &str) -> AdminResult<Observed> {
        let own = self.own_writes.lock().await;
        let revision = self.revision(key).await?;
        Ok(Observed {
            revision,
            own: own.get(key) == Some(&revision),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::persistence::APP_CACHE_KEY;

    #[tokio::test]
    async fn test_clones_share_write_origin() {
        let config = Config::new_test().await.unwrap();
        let mine = config.local_cache();
        let theirs = config.local_cache();

        let revision = mine.write_chapters(APP_CACHE_KEY, &[]).await.unwrap();
        let seen = mine.clone().observe(APP_CACHE_KEY).await.unwrap();
        assert_eq!(seen, Observed { revision, own: true });
        assert!(!theirs.observe(APP_CACHE_KEY).await.unwrap().own);

        theirs.write_chapters(APP_CACHE_KEY, &[]).await.unwrap();
        let seen = mine.observe(APP_CACHE_KEY).await.unwrap();
        assert_eq!(seen.revision, revision + 1);
        assert!(!seen.own);
    }
}
