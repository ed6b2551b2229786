//! Persistence gateway: remote document, local cache mirror and export/import
//!
//! The remote document is the source of truth whenever it answers. Every
//! successful save is mirrored into two local cache keys and announced to
//! other sessions through the change notifier. Cache writes are best effort:
//! a failing mirror is logged and never turns a successful save into an error.

pub mod cache;
pub mod merge;
pub mod transfer;

pub use cache::{LocalCache, Observed};
pub use merge::{merge_with_local_cache, parse_chapter_document};
pub use transfer::{ImportReport, default_export_name};

use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::api::{NewExerciseBody, RemoteDocument};
use crate::content::{Chapter, EntityKind, Exercise};
use crate::error::{AdminError, AdminResult};
use crate::sync::ChangeNotifier;

/// Cache key read by the admin panel itself
pub const LEGACY_CACHE_KEY: &str = "CHAPITRES";
/// Cache key read by the learner-facing app as its fallback
pub const APP_CACHE_KEY: &str = "CHAPITRES_AUTEUR";
pub const CACHE_KEYS: [&str; 2] = [LEGACY_CACHE_KEY, APP_CACHE_KEY];

/// What the server said about a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub message: String,
    pub chapters: usize,
}

#[derive(Clone)]
pub struct PersistenceGateway {
    remote: Arc<dyn RemoteDocument>,
    cache: LocalCache,
    notifier: Option<Arc<ChangeNotifier>>,
}

impl PersistenceGateway {
    pub fn new(remote: Arc<dyn RemoteDocument>, cache: LocalCache) -> Self {
        Self {
            remote,
            cache,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<ChangeNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn notifier(&self) -> Option<&Arc<ChangeNotifier>> {
        self.notifier.as_ref()
    }

    pub fn describe_remote(&self) -> String {
        self.remote.describe()
    }

    /// GET the remote chapter collection
    pub async fn fetch_authoritative(&self) -> AdminResult<Vec<Chapter>> {
        let document = self
            .remote
            .fetch_document()
            .await
            .map_err(AdminError::load_failed)?;

        let chapters = parse_chapter_document(document).map_err(|reason| AdminError::Load {
            reason,
            network: None,
        })?;
        debug!("Fetched {} chapters from {}", chapters.len(), self.remote.describe());
        Ok(chapters)
    }

    /// Cached collection: the app-facing key first, then the legacy key.
    /// Unreadable cache entries count as empty.
    pub async fn read_cache(&self) -> Vec<Chapter> {
        for key in [APP_CACHE_KEY, LEGACY_CACHE_KEY] {
            match self.cache.read_chapters(key).await {
                Ok(Some(chapters)) => return chapters,
                Ok(None) => continue,
                Err(e) => warn!("Ignoring local cache key {}: {}", key, e),
            }
        }
        Vec::new()
    }

    /// Remote collection plus cache-only chapters
    pub async fn load_effective(&self) -> AdminResult<Vec<Chapter>> {
        let remote = self.fetch_authoritative().await?;
        let cached = self.read_cache().await;
        Ok(merge_with_local_cache(remote, cached))
    }

    /// Explicit offline fallback: the cache alone
    pub async fn load_from_cache(&self) -> AdminResult<Vec<Chapter>> {
        for key in [APP_CACHE_KEY, LEGACY_CACHE_KEY] {
            if let Some(chapters) = self.cache.read_chapters(key).await? {
                warn!("Using {} cached chapters from {} (offline)", chapters.len(), key);
                return Ok(chapters);
            }
        }
        Err(AdminError::Load {
            reason: "the local cache is empty".to_string(),
            network: None,
        })
    }

    /// POST the full collection, then mirror it locally and announce the change
    pub async fn persist(&self, chapters: &[Chapter]) -> AdminResult<SaveReceipt> {
        let envelope = self.remote.save_chapters(chapters).await?;
        if !envelope.success {
            return Err(AdminError::SaveRejected(envelope.reason()));
        }

        info!("Persisted {} chapters", chapters.len());
        self.mirror(chapters).await;
        self.announce(chapters.len()).await;

        Ok(SaveReceipt {
            message: envelope
                .message
                .unwrap_or_else(|| format!("{} chapitres sauvegardés", chapters.len())),
            chapters: chapters.len(),
        })
    }

    /// Write both cache keys, logging instead of failing
    pub async fn mirror(&self, chapters: &[Chapter]) {
        for key in CACHE_KEYS {
            if let Err(e) = self.cache.write_chapters(key, chapters).await {
                warn!("Could not mirror chapters into local cache key {}: {}", key, e);
            }
        }
    }

    async fn announce(&self, count: usize) {
        if let Some(notifier) = &self.notifier {
            notifier.notify_chapters_updated(count).await;
        }
    }

    pub async fn create_exercise(&self, step_id: &str, exercise: &Exercise) -> AdminResult<()> {
        let body = NewExerciseBody::from_exercise(exercise).map_err(|e| {
            AdminError::validation(EntityKind::Exercise, format!("cannot encode exercise: {}", e))
        })?;
        self.remote.create_exercise(step_id, &body).await?;
        Ok(())
    }

    pub async fn update_exercise(&self, exercise: &Exercise) -> AdminResult<()> {
        self.remote.update_exercise(exercise).await?;
        Ok(())
    }

    pub async fn delete_exercise(&self, exercise_id: &str) -> AdminResult<()> {
        let envelope = self.remote.delete_exercise(exercise_id).await?;
        if !envelope.success {
            return Err(AdminError::SaveRejected(envelope.reason()));
        }
        Ok(())
    }

    /// Mirror and announce after an entity-level write the server applied itself
    pub async fn after_entity_write(&self, reloaded: &[Chapter]) {
        self.mirror(reloaded).await;
        self.announce(reloaded.len()).await;
    }

    /// Pretty JSON of the merged collection
    pub async fn export_document(&self) -> AdminResult<(String, usize)> {
        let chapters = self.load_effective().await?;
        Ok((transfer::render_export(&chapters)?, chapters.len()))
    }

    pub async fn export_to_file(&self, path: &Path) -> AdminResult<usize> {
        let (document, count) = self.export_document().await?;
        tokio::fs::write(path, document)
            .await
            .map_err(|e| AdminError::Storage(format!("cannot write {}: {}", path.display(), e)))?;
        info!("Exported {} chapters to {}", count, path.display());
        Ok(count)
    }

    /// Merge chapters with unseen ids into the local cache.
    ///
    /// Colliding ids are skipped, never overwritten. The caller reloads
    /// afterwards to pick the new chapters up.
    pub async fn import_document(&self, content: &str) -> AdminResult<ImportReport> {
        let imported = transfer::parse_import(content)?;
        let mut collection = self.load_effective().await?;
        let (fresh, report) = transfer::split_new_chapters(&collection, imported);

        if fresh.is_empty() {
            info!("Import brought no new chapters ({} skipped)", report.skipped.len());
            return Ok(report);
        }

        collection.extend(fresh);
        for key in CACHE_KEYS {
            self.cache.write_chapters(key, &collection).await?;
        }
        self.announce(collection.len()).await;

        info!(
            "Imported {} chapters ({} skipped)",
            report.imported.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    pub async fn import_from_file(&self, path: &Path) -> AdminResult<ImportReport> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AdminError::Storage(format!("cannot read {}: {}", path.display(), e)))?;
        self.import_document(&content).await
    }
}
