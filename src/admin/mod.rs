//! One authoring session ("tab"): the tree store, its selection, the
//! clipboard and the gateway that persists every mutation.
//!
//! Mutations never patch the store directly. They compute the next
//! collection, persist it, and only then swap it in and reload from the
//! remote document. A failed save therefore leaves the store untouched.
//! Every mutating operation takes `&mut self`, so a session never has two
//! saves in flight.

pub mod chapters;
pub mod copy_paste;
pub mod exercises;
pub mod library;
pub mod reloader;
pub mod steps;

pub use chapters::{ChapterChanges, ChapterDraft};
pub use exercises::ExerciseLocator;
pub use reloader::SessionReloader;
pub use steps::{StepChanges, StepDraft};

use log::{debug, info, warn};

use crate::clipboard::{Clipboard, PasteAvailability};
use crate::content::{Chapter, EntityKind, IdGenerator, Level};
use crate::error::{AdminError, AdminResult};
use crate::persistence::{PersistenceGateway, SaveReceipt};
use crate::store::{ContentStore, TreeSource};

/// Yes/no gate in front of destructive operations
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything (`--force`, scripted use)
pub struct AlwaysConfirm;

impl Confirmation for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Entities removed from the tree, the target included. `reloaded` is
    /// false when the delete went through but the follow-up reload failed.
    Deleted { removed: usize, reloaded: bool },
    Cancelled,
}

/// Result of a successful create, edit, duplicate or paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub entity: EntityKind,
    pub id: String,
    pub titre: String,
    /// Server message for whole-document saves, a fixed label otherwise
    pub message: String,
    /// False when the save went through but the follow-up reload failed
    pub reloaded: bool,
}

pub struct AdminSession {
    store: ContentStore,
    gateway: PersistenceGateway,
    clipboard: Clipboard,
    ids: IdGenerator,
    paste: PasteAvailability,
}

impl AdminSession {
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self::with_ids(gateway, IdGenerator::new())
    }

    pub fn with_ids(gateway: PersistenceGateway, ids: IdGenerator) -> Self {
        Self {
            store: ContentStore::new(),
            gateway,
            clipboard: Clipboard::new(),
            ids,
            paste: PasteAvailability::default(),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Which paste actions are currently offered
    pub fn paste_availability(&self) -> PasteAvailability {
        self.paste
    }

    /// Start listening for changes made by other sessions, if a notifier is attached
    pub async fn start_listening(&self) -> AdminResult<bool> {
        match self.gateway.notifier() {
            Some(notifier) => notifier.init().await,
            None => Ok(false),
        }
    }

    /// Remote document merged with cache-only chapters
    pub async fn load(&mut self) -> AdminResult<usize> {
        let chapters = self.gateway.load_effective().await?;
        self.store.replace(chapters, TreeSource::Remote);
        self.refresh_paste_availability();
        info!("Loaded {} chapters", self.store.len());
        Ok(self.store.len())
    }

    /// Explicit local-only fallback when the remote document is unreachable
    pub async fn load_offline(&mut self) -> AdminResult<usize> {
        let chapters = self.gateway.load_from_cache().await?;
        self.store.replace(chapters, TreeSource::LocalCache);
        self.refresh_paste_availability();
        Ok(self.store.len())
    }

    /// `load`, falling back to the cache on failure when allowed
    pub async fn load_with_fallback(&mut self, offline_fallback: bool) -> AdminResult<TreeSource> {
        match self.load().await {
            Ok(_) => Ok(TreeSource::Remote),
            Err(e) if offline_fallback => {
                warn!("Remote load failed, trying the local cache: {}", e);
                self.load_offline().await.map_err(|_| e)?;
                Ok(TreeSource::LocalCache)
            }
            Err(e) => Err(e),
        }
    }

    /// Full reload from the remote document
    pub async fn reload(&mut self) -> AdminResult<()> {
        self.load().await.map(|_| ())
    }

    pub fn select_level(&mut self, level: Level) {
        self.store.select_level(level);
        self.refresh_paste_availability();
    }

    pub fn select_chapter(&mut self, id: &str) -> AdminResult<()> {
        self.store.select_chapter(id)?;
        self.refresh_paste_availability();
        Ok(())
    }

    pub fn select_step(&mut self, index: usize) -> AdminResult<()> {
        self.store.select_step(index)?;
        self.refresh_paste_availability();
        Ok(())
    }

    pub fn select_exercise(&mut self, index: usize) -> AdminResult<()> {
        self.store.select_exercise(index)?;
        self.refresh_paste_availability();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
        self.refresh_paste_availability();
    }

    pub(crate) fn refresh_paste_availability(&mut self) {
        self.paste = self.clipboard.availability(self.store.selection());
    }

    /// Snapshot of the collection to compute the next state on
    pub(crate) fn working_copy(&self) -> Vec<Chapter> {
        self.store.chapters().to_vec()
    }

    /// Persist `next`, swap it in, then reload from the remote document
    pub(crate) async fn commit(&mut self, next: Vec<Chapter>) -> AdminResult<(SaveReceipt, bool)> {
        let receipt = self.gateway.persist(&next).await?;
        self.store.replace(next, TreeSource::Remote);

        let reloaded = match self.gateway.load_effective().await {
            Ok(chapters) => {
                self.store.replace(chapters, TreeSource::Remote);
                true
            }
            Err(e) => {
                warn!("Saved, but reloading the tree failed: {}", e);
                false
            }
        };
        self.refresh_paste_availability();
        debug!("Commit done ({} chapters, reloaded: {})", self.store.len(), reloaded);
        Ok((receipt, reloaded))
    }

    /// Reload after the server applied an entity-level write itself
    pub(crate) async fn reload_after_entity_write(&mut self) -> bool {
        let reloaded = match self.gateway.load_effective().await {
            Ok(chapters) => {
                self.gateway.after_entity_write(&chapters).await;
                self.store.replace(chapters, TreeSource::Remote);
                true
            }
            Err(e) => {
                warn!("Saved, but reloading the tree failed: {}", e);
                false
            }
        };
        self.refresh_paste_availability();
        reloaded
    }
}

/// Position of a chapter in a working copy
pub(crate) fn position_of(chapters: &[Chapter], id: &str) -> AdminResult<usize> {
    chapters
        .iter()
        .position(|chapter| chapter.id == id)
        .ok_or_else(|| AdminError::not_found(EntityKind::Chapter, format!("chapter {}", id)))
}

pub(crate) fn require_title(entity: EntityKind, titre: &str) -> AdminResult<()> {
    if titre.trim().is_empty() {
        return Err(AdminError::validation(entity, "a title is required"));
    }
    Ok(())
}
