use log::info;

use super::{AdminSession, Confirmation, DeleteOutcome, MutationOutcome, position_of, require_title};
use crate::content::{Chapter, EntityKind, Level, subtree_size};
use crate::error::{AdminError, AdminResult};

/// Fields of a new chapter; `id` and `niveau` are mandatory
#[derive(Debug, Clone, Default)]
pub struct ChapterDraft {
    pub id: String,
    pub titre: String,
    pub niveau: Option<String>,
    pub description: Option<String>,
}

/// In-place edit; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ChapterChanges {
    pub titre: Option<String>,
    pub niveau: Option<String>,
    pub description: Option<String>,
}

fn require_level(niveau: Option<&str>) -> AdminResult<Level> {
    let raw = niveau
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AdminError::validation(EntityKind::Chapter, "a level (N1..N4) is required"))?;
    raw.parse()
        .map_err(|e: String| AdminError::validation(EntityKind::Chapter, e))
}

impl AdminSession {
    pub async fn create_chapter(&mut self, draft: ChapterDraft) -> AdminResult<MutationOutcome> {
        let id = draft.id.trim().to_string();
        if id.is_empty() {
            return Err(AdminError::validation(EntityKind::Chapter, "an id is required"));
        }
        require_title(EntityKind::Chapter, &draft.titre)?;
        let level = require_level(draft.niveau.as_deref())?;
        if self.store.contains_chapter(&id) {
            return Err(AdminError::DuplicateId {
                entity: EntityKind::Chapter,
                id,
            });
        }

        let mut chapter = Chapter::new(id.clone(), draft.titre.trim());
        chapter.niveau = Some(level.to_string());
        chapter.description = draft.description.filter(|d| !d.trim().is_empty());

        let titre = chapter.titre.clone();
        let mut next = self.working_copy();
        next.push(chapter);
        let (receipt, reloaded) = self.commit(next).await?;

        info!("Created chapter {} ({})", id, level);
        Ok(MutationOutcome {
            entity: EntityKind::Chapter,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    pub async fn edit_chapter(
        &mut self,
        id: &str,
        changes: ChapterChanges,
    ) -> AdminResult<MutationOutcome> {
        let mut next = self.working_copy();
        let index = position_of(&next, id)?;
        let chapter = &mut next[index];

        if let Some(titre) = changes.titre {
            require_title(EntityKind::Chapter, &titre)?;
            chapter.titre = titre.trim().to_string();
        }
        if let Some(niveau) = changes.niveau {
            chapter.niveau = Some(require_level(Some(&niveau))?.to_string());
        }
        if let Some(description) = changes.description {
            chapter.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        let titre = chapter.titre.clone();

        let (receipt, reloaded) = self.commit(next).await?;
        Ok(MutationOutcome {
            entity: EntityKind::Chapter,
            id: id.to_string(),
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    /// Remove a chapter with all its steps and exercises
    pub async fn delete_chapter(
        &mut self,
        id: &str,
        confirmation: &dyn Confirmation,
    ) -> AdminResult<DeleteOutcome> {
        let mut next = self.working_copy();
        let index = position_of(&next, id)?;
        let chapter = &next[index];
        let removed = subtree_size(chapter);

        let prompt = format!(
            "Supprimer le chapitre \"{}\" ({} étapes, {} exercices) ?",
            chapter.titre,
            chapter.etapes.len(),
            chapter.exercise_count()
        );
        if !confirmation.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }

        next.remove(index);
        let (_, reloaded) = self.commit(next).await?;
        info!("Deleted chapter {} ({} entities)", id, removed);
        Ok(DeleteOutcome::Deleted { removed, reloaded })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{chapter, session};
    use super::*;
    use crate::error::ErrorKind;

    fn draft(id: &str) -> ChapterDraft {
        ChapterDraft {
            id: id.to_string(),
            titre: "Test".to_string(),
            niveau: Some("N1".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_duplicate_id() {
        let (mut session, document) = session(vec![chapter("101", 1, 1)]).await;

        let outcome = session.create_chapter(draft("ch9")).await.unwrap();
        assert_eq!(outcome.id, "ch9");
        assert!(outcome.reloaded);
        assert_eq!(session.store().len(), 2);
        assert!(document.chapters().iter().any(|c| c.id == "ch9"));

        let err = session.create_chapter(draft("ch9")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateId);
        assert_eq!(session.store().len(), 2);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let (mut session, document) = session(vec![]).await;

        let mut no_level = draft("c1");
        no_level.niveau = None;
        let mut no_title = draft("c1");
        no_title.titre = "  ".to_string();
        let mut bad_level = draft("c1");
        bad_level.niveau = Some("N7".to_string());

        for draft in [no_level, no_title, bad_level, draft("")] {
            let err = session.create_chapter(draft).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(document.requests().iter().all(|r| r.starts_with("GET")));
    }

    #[tokio::test]
    async fn test_edit_keeps_identity() {
        let (mut session, _) = session(vec![chapter("101", 2, 1)]).await;
        session
            .edit_chapter(
                "101",
                ChapterChanges {
                    titre: Some("Fractions".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let edited = session.store().find_chapter("101").unwrap();
        assert_eq!(edited.titre, "Fractions");
        assert_eq!(edited.etapes.len(), 2);
        assert_eq!(edited.niveau.as_deref(), Some("N1"));
    }

    #[tokio::test]
    async fn test_edit_unknown_chapter() {
        let (mut session, _) = session(vec![]).await;
        let err = session
            .edit_chapter("nope", ChapterChanges::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_counts() {
        let (mut session, _) = session(vec![chapter("101", 3, 2), chapter("102", 1, 1)]).await;

        let cancelled = session.delete_chapter("101", &|_: &str| false).await.unwrap();
        assert_eq!(cancelled, DeleteOutcome::Cancelled);
        assert_eq!(session.store().len(), 2);

        let outcome = session.delete_chapter("101", &|_: &str| true).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { removed: 1 + 3 + 3 * 2, reloaded: true });
        assert!(session.store().find_chapter("101").is_none());

        let err = session.delete_chapter("101", &|_: &str| true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_reports_failed_reload() {
        let (mut session, document) = session(vec![chapter("101", 1, 1), chapter("102", 0, 0)]).await;
        document.fail_reads(true);

        let outcome = session.delete_chapter("101", &|_: &str| true).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { removed: 3, reloaded: false });
        assert_eq!(document.chapters().len(), 1);
        assert!(session.store().find_chapter("101").is_none());
    }

    #[tokio::test]
    async fn test_network_failure_leaves_store_unchanged() {
        let (mut session, document) = session(vec![chapter("101", 1, 1)]).await;
        document.set_timing_out(true);

        let err = session.create_chapter(draft("ch9")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_timeout());
        assert_eq!(session.store().len(), 1);
        assert!(!session.store().contains_chapter("ch9"));
    }

    #[tokio::test]
    async fn test_rejected_save_leaves_store_unchanged() {
        let (mut session, document) = session(vec![chapter("101", 1, 1)]).await;
        document.refuse_saves(Some("disk full"));

        let err = session.create_chapter(draft("ch9")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SaveRejected);
        assert_eq!(session.store().len(), 1);
    }
}
