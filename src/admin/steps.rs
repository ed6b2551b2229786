use log::info;

use super::{AdminSession, Confirmation, DeleteOutcome, MutationOutcome, position_of, require_title};
use crate::content::{EntityKind, Step, StepType};
use crate::error::{AdminError, AdminResult};

/// Fields of a new step. Without an id one is generated.
#[derive(Debug, Clone)]
pub struct StepDraft {
    pub id: Option<String>,
    pub titre: String,
    pub step_type: StepType,
    pub duree: u32,
    pub description: Option<String>,
}

impl Default for StepDraft {
    fn default() -> Self {
        Self {
            id: None,
            titre: String::new(),
            step_type: StepType::default(),
            duree: 30,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StepChanges {
    pub titre: Option<String>,
    pub step_type: Option<StepType>,
    pub duree: Option<u32>,
    pub description: Option<String>,
}

fn step_not_found(chapter_id: &str, index: usize) -> AdminError {
    AdminError::not_found(
        EntityKind::Step,
        format!("step {} of chapter {}", index, chapter_id),
    )
}

impl AdminSession {
    pub async fn create_step(
        &mut self,
        chapter_id: &str,
        draft: StepDraft,
    ) -> AdminResult<MutationOutcome> {
        require_title(EntityKind::Step, &draft.titre)?;

        let mut next = self.working_copy();
        let index = position_of(&next, chapter_id)?;
        let chapter = &mut next[index];

        let id = match draft.id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()) {
            Some(id) if chapter.etapes.iter().any(|step| step.id == id) => {
                return Err(AdminError::DuplicateId {
                    entity: EntityKind::Step,
                    id,
                });
            }
            Some(id) => id,
            None => self.ids.next_id(),
        };

        let mut step = Step::new(id.clone(), draft.titre.trim());
        step.step_type = draft.step_type;
        step.duree = draft.duree;
        step.description = draft.description.filter(|d| !d.trim().is_empty());
        let titre = step.titre.clone();
        chapter.etapes.push(step);

        let (receipt, reloaded) = self.commit(next).await?;
        info!("Created step {} in chapter {}", id, chapter_id);
        Ok(MutationOutcome {
            entity: EntityKind::Step,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    pub async fn edit_step(
        &mut self,
        chapter_id: &str,
        index: usize,
        changes: StepChanges,
    ) -> AdminResult<MutationOutcome> {
        let mut next = self.working_copy();
        let position = position_of(&next, chapter_id)?;
        let step = next[position]
            .etapes
            .get_mut(index)
            .ok_or_else(|| step_not_found(chapter_id, index))?;

        if let Some(titre) = changes.titre {
            require_title(EntityKind::Step, &titre)?;
            step.titre = titre.trim().to_string();
        }
        if let Some(step_type) = changes.step_type {
            step.step_type = step_type;
        }
        if let Some(duree) = changes.duree {
            step.duree = duree;
        }
        if let Some(description) = changes.description {
            step.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        let (id, titre) = (step.id.clone(), step.titre.clone());

        let (receipt, reloaded) = self.commit(next).await?;
        Ok(MutationOutcome {
            entity: EntityKind::Step,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    /// Remove a step and its exercises
    pub async fn delete_step(
        &mut self,
        chapter_id: &str,
        index: usize,
        confirmation: &dyn Confirmation,
    ) -> AdminResult<DeleteOutcome> {
        let mut next = self.working_copy();
        let position = position_of(&next, chapter_id)?;
        let steps = &mut next[position].etapes;
        let step = steps.get(index).ok_or_else(|| step_not_found(chapter_id, index))?;
        let removed = 1 + step.exercices.len();

        let prompt = format!(
            "Supprimer l'étape \"{}\" ({} exercices) ?",
            step.titre,
            step.exercices.len()
        );
        if !confirmation.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }

        steps.remove(index);
        let (_, reloaded) = self.commit(next).await?;
        info!("Deleted step {} of chapter {}", index, chapter_id);
        Ok(DeleteOutcome::Deleted { removed, reloaded })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{chapter, session};
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_create_step_generates_id() {
        let (mut session, _) = session(vec![chapter("101", 1, 0)]).await;
        let outcome = session
            .create_step(
                "101",
                StepDraft {
                    titre: "Diagnostic".to_string(),
                    step_type: StepType::Diagnostic,
                    duree: 15,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(outcome.id.starts_with("t_"));
        let step = session.store().find_step("101", 1).unwrap();
        assert_eq!(step.id, outcome.id);
        assert_eq!(step.step_type, StepType::Diagnostic);
        assert_eq!(step.duree, 15);
        assert!(step.created_at.is_some());
    }

    #[tokio::test]
    async fn test_step_id_collision_in_chapter() {
        let (mut session, _) = session(vec![chapter("101", 1, 0)]).await;
        let err = session
            .create_step(
                "101",
                StepDraft {
                    id: Some("101-s0".to_string()),
                    titre: "Doublon".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateId);
        assert_eq!(session.store().find_chapter("101").unwrap().etapes.len(), 1);
    }

    #[tokio::test]
    async fn test_create_step_in_unknown_chapter() {
        let (mut session, _) = session(vec![]).await;
        let err = session
            .create_step(
                "nope",
                StepDraft {
                    titre: "X".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_edit_and_delete_step() {
        let (mut session, _) = session(vec![chapter("101", 2, 3)]).await;
        session
            .edit_step(
                "101",
                1,
                StepChanges {
                    duree: Some(45),
                    step_type: Some(StepType::Evaluation),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let step = session.store().find_step("101", 1).unwrap();
        assert_eq!((step.duree, step.step_type), (45, StepType::Evaluation));
        assert_eq!(step.id, "101-s1");

        let outcome = session.delete_step("101", 0, &|_: &str| true).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { removed: 4, reloaded: true });
        let remaining = &session.store().find_chapter("101").unwrap().etapes;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "101-s1");

        let err = session.delete_step("101", 5, &|_: &str| true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
    #[tokio::test]
    async fn test_delete_step_reports_failed_reload() {
        let (mut session, document) = session(vec![chapter("101", 2, 1)]).await;
        document.fail_reads(true);

        let outcome = session.delete_step("101", 1, &|_: &str| true).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted { removed: 2, reloaded: false });
        assert_eq!(document.chapters()[0].etapes.len(), 1);
    }
}
