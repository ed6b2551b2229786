use log::info;

use super::{AdminSession, Confirmation, DeleteOutcome, MutationOutcome, position_of};
use crate::content::{EntityKind, Exercise};
use crate::error::{AdminError, AdminResult};

/// Chapter id, step index and exercise index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseLocator {
    pub chapter_id: String,
    pub step_index: usize,
    pub index: usize,
}

impl ExerciseLocator {
    pub fn new(chapter_id: impl Into<String>, step_index: usize, index: usize) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            step_index,
            index,
        }
    }
}

impl AdminSession {
    /// Create through `POST /steps/{stepId}/exercises`; the server assigns the id
    pub async fn create_exercise(
        &mut self,
        chapter_id: &str,
        step_index: usize,
        exercise: Exercise,
    ) -> AdminResult<MutationOutcome> {
        exercise.validate()?;
        let step = self.store.require_step(chapter_id, step_index)?;
        let step_id = step.id.clone();
        let before: Vec<String> = step.exercices.iter().map(|e| e.id.clone()).collect();
        let titre = exercise.display_title();

        self.gateway.create_exercise(&step_id, &exercise).await?;
        let reloaded = self.reload_after_entity_write().await;

        // The new id is whichever one was not there before
        let id = self
            .store
            .find_step(chapter_id, step_index)
            .and_then(|step| step.exercices.iter().find(|e| !before.contains(&e.id)))
            .map(|e| e.id.clone())
            .unwrap_or_default();

        info!("Created {} exercise in step {}", exercise.kind(), step_id);
        Ok(MutationOutcome {
            entity: EntityKind::Exercise,
            id,
            titre,
            message: "Exercice créé".to_string(),
            reloaded,
        })
    }

    /// Replace the exercise through `PUT /exercises/{id}`, keeping its id
    pub async fn edit_exercise(
        &mut self,
        locator: &ExerciseLocator,
        mut exercise: Exercise,
    ) -> AdminResult<MutationOutcome> {
        let current = self.store.require_exercise(
            &locator.chapter_id,
            locator.step_index,
            locator.index,
        )?;
        exercise.id = current.id.clone();
        exercise.validate()?;

        self.gateway.update_exercise(&exercise).await?;
        let reloaded = self.reload_after_entity_write().await;

        Ok(MutationOutcome {
            entity: EntityKind::Exercise,
            id: exercise.id.clone(),
            titre: exercise.display_title(),
            message: "Exercice mis à jour".to_string(),
            reloaded,
        })
    }

    pub async fn delete_exercise(
        &mut self,
        locator: &ExerciseLocator,
        confirmation: &dyn Confirmation,
    ) -> AdminResult<DeleteOutcome> {
        let exercise = self.store.require_exercise(
            &locator.chapter_id,
            locator.step_index,
            locator.index,
        )?;
        let id = exercise.id.clone();

        let prompt = format!("Supprimer l'exercice \"{}\" ?", exercise.display_title());
        if !confirmation.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.gateway.delete_exercise(&id).await?;
        let reloaded = self.reload_after_entity_write().await;
        info!("Deleted exercise {}", id);
        Ok(DeleteOutcome::Deleted { removed: 1, reloaded })
    }

    /// Drag-and-drop reorder inside one step, applied to the merged view
    pub async fn move_exercise(
        &mut self,
        chapter_id: &str,
        step_index: usize,
        from: usize,
        to: usize,
    ) -> AdminResult<MutationOutcome> {
        let mut next = self.gateway.load_effective().await?;
        let position = position_of(&next, chapter_id)?;
        let step = next[position].etapes.get_mut(step_index).ok_or_else(|| {
            AdminError::not_found(
                EntityKind::Step,
                format!("step {} of chapter {}", step_index, chapter_id),
            )
        })?;

        if from >= step.exercices.len() {
            return Err(AdminError::not_found(
                EntityKind::Exercise,
                format!("exercise {} of step {} in chapter {}", from, step_index, chapter_id),
            ));
        }
        if to >= step.exercices.len() {
            return Err(AdminError::validation(
                EntityKind::Exercise,
                format!("target position {} is past the end of the step", to),
            ));
        }

        let moved = step.exercices.remove(from);
        let (id, titre) = (moved.id.clone(), moved.display_title());
        step.exercices.insert(to, moved);

        let (receipt, reloaded) = self.commit(next).await?;
        Ok(MutationOutcome {
            entity: EntityKind::Exercise,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }
}
