use chrono::Datelike;
use log::info;
use std::path::Path;

use super::{AdminSession, MutationOutcome};
use crate::catalog;
use crate::content::{EntityKind, Exercise};
use crate::error::{AdminError, AdminResult};
use crate::persistence::ImportReport;

impl AdminSession {
    /// Append a fresh copy of a theme's chapter and persist it
    pub async fn instantiate_theme(&mut self, index: usize) -> AdminResult<MutationOutcome> {
        let theme = catalog::theme(index)?;
        let niveau = self.store.selection().level().map(|level| level.to_string());
        let ordre = u32::try_from(self.store.len()).unwrap_or(u32::MAX);
        let year = chrono::Local::now().year();

        let chapter = theme
            .instantiate(&self.ids, year, ordre, niveau)
            .ok_or_else(|| {
                AdminError::validation(EntityKind::Chapter, format!("theme '{}' is empty", theme.name))
            })?;
        let (id, titre) = (chapter.id.clone(), chapter.titre.clone());
        let steps = chapter.etapes.len();

        let mut next = self.working_copy();
        next.push(chapter);
        let (receipt, reloaded) = self.commit(next).await?;

        info!("Created chapter {} from theme '{}' ({} steps)", id, theme.name, steps);
        Ok(MutationOutcome {
            entity: EntityKind::Chapter,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    /// Skeleton for the create-exercise form; nothing is saved
    pub fn instantiate_template(&self, index: usize) -> AdminResult<Exercise> {
        catalog::instantiate_template(index)
    }

    pub async fn export_to_file(&self, path: &Path) -> AdminResult<usize> {
        self.gateway.export_to_file(path).await
    }

    /// Merge new chapters from a document into the cache, then reload
    pub async fn import_from_file(&mut self, path: &Path) -> AdminResult<ImportReport> {
        let report = self.gateway.import_from_file(path).await?;
        if report.imported_count() > 0 {
            self.reload().await?;
        }
        Ok(report)
    }

    pub async fn import_document(&mut self, content: &str) -> AdminResult<ImportReport> {
        let report = self.gateway.import_document(content).await?;
        if report.imported_count() > 0 {
            self.reload().await?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{chapter, session};
    use super::*;
    use crate::content::Level;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_theme_inherits_selected_level() {
        let (mut session, document) = session(vec![chapter("101", 1, 1)]).await;
        session.select_level(Level::N3);

        let outcome = session.instantiate_theme(1).await.unwrap();
        let created = session.store().find_chapter(&outcome.id).unwrap();

        assert!(created.titre.starts_with("Cours Intensif Douane - "));
        assert_eq!(created.niveau.as_deref(), Some("N3"));
        assert_eq!(created.ordre, Some(1));
        assert_eq!(created.etapes.len(), 5);
        assert_eq!(document.chapters().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_theme() {
        let (mut session, _) = session(vec![]).await;
        let err = session.instantiate_theme(99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_export_then_import_is_a_superset() {
        let (mut session, _) = session(vec![chapter("101", 1, 2), chapter("201", 2, 0)]).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        assert_eq!(session.export_to_file(&path).await.unwrap(), 2);
        let before: HashSet<String> =
            session.store().chapters().iter().map(|c| c.id.clone()).collect();

        let report = session.import_from_file(&path).await.unwrap();
        assert_eq!(report.imported_count(), 0);
        assert_eq!(report.skipped.len(), 2);

        let after: HashSet<String> =
            session.store().chapters().iter().map(|c| c.id.clone()).collect();
        assert!(after.is_superset(&before));
    }

    #[tokio::test]
    async fn test_import_adds_new_chapters_and_reloads() {
        let (mut session, _) = session(vec![chapter("101", 1, 0)]).await;
        let document = serde_json::to_string(&vec![chapter("101", 3, 3), chapter("301", 1, 1)]).unwrap();

        let report = session.import_document(&document).await.unwrap();
        assert_eq!(report.imported, vec!["301".to_string()]);
        assert_eq!(report.skipped, vec!["101".to_string()]);
        assert_eq!(session.store().len(), 2);
        // Colliding ids are never overwritten
        assert_eq!(session.store().find_chapter("101").unwrap().etapes.len(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_non_arrays() {
        let (mut session, _) = session(vec![]).await;
        let err = session
            .import_document(r#"{"chapitres": []}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }
}
