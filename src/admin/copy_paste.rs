use log::info;

use super::{AdminSession, ExerciseLocator, MutationOutcome, position_of};
use crate::clipboard::{ClipboardEntry, DUPLICATE_SUFFIX, clone_chapter, clone_exercise, clone_step};
use crate::content::EntityKind;
use crate::error::{AdminError, AdminResult};

impl AdminSession {
    pub fn copy_chapter(&mut self, id: &str) -> AdminResult<String> {
        let chapter = self.store.require_chapter(id)?.clone();
        self.copy(ClipboardEntry::Chapter(chapter))
    }

    pub fn copy_step(&mut self, chapter_id: &str, index: usize) -> AdminResult<String> {
        let step = self.store.require_step(chapter_id, index)?.clone();
        self.copy(ClipboardEntry::Step(step))
    }

    pub fn copy_exercise(&mut self, locator: &ExerciseLocator) -> AdminResult<String> {
        let exercise = self
            .store
            .require_exercise(&locator.chapter_id, locator.step_index, locator.index)?
            .clone();
        self.copy(ClipboardEntry::Exercise(exercise))
    }

    /// Copy whatever is selected deepest: exercise, else step, else chapter
    pub fn copy_selection(&mut self) -> AdminResult<String> {
        let selection = self.store.selection();
        match (
            selection.chapter_id().map(str::to_string),
            selection.step_index(),
            selection.exercise_index(),
        ) {
            (Some(chapter_id), Some(step), Some(index)) => {
                self.copy_exercise(&ExerciseLocator::new(chapter_id, step, index))
            }
            (Some(chapter_id), Some(step), None) => self.copy_step(&chapter_id, step),
            (Some(chapter_id), None, _) => self.copy_chapter(&chapter_id),
            (None, _, _) => Err(AdminError::nothing_selected(EntityKind::Chapter)),
        }
    }

    /// Store the entry, then refresh which paste actions are offered
    fn copy(&mut self, entry: ClipboardEntry) -> AdminResult<String> {
        let label = entry.label();
        self.clipboard.copy(entry);
        self.refresh_paste_availability();
        Ok(label)
    }

    pub async fn paste_chapter(&mut self) -> AdminResult<MutationOutcome> {
        let chapter = self.clipboard.paste_chapter(&self.ids)?;
        let (id, titre) = (chapter.id.clone(), chapter.titre.clone());

        let mut next = self.working_copy();
        next.push(chapter);
        let (receipt, reloaded) = self.commit(next).await?;

        info!("Pasted chapter {}", id);
        Ok(MutationOutcome {
            entity: EntityKind::Chapter,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    pub async fn paste_step(&mut self, chapter_id: &str) -> AdminResult<MutationOutcome> {
        let step = self.clipboard.paste_step(&self.ids)?;
        let (id, titre) = (step.id.clone(), step.titre.clone());

        let mut next = self.working_copy();
        let position = position_of(&next, chapter_id)?;
        next[position].etapes.push(step);
        let (receipt, reloaded) = self.commit(next).await?;

        info!("Pasted step {} into chapter {}", id, chapter_id);
        Ok(MutationOutcome {
            entity: EntityKind::Step,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    pub async fn paste_exercise(
        &mut self,
        chapter_id: &str,
        step_index: usize,
    ) -> AdminResult<MutationOutcome> {
        let exercise = self.clipboard.paste_exercise(&self.ids)?;
        let (id, titre) = (exercise.id.clone(), exercise.display_title());

        let mut next = self.working_copy();
        let position = position_of(&next, chapter_id)?;
        next[position]
            .etapes
            .get_mut(step_index)
            .ok_or_else(|| {
                AdminError::not_found(
                    EntityKind::Step,
                    format!("step {} of chapter {}", step_index, chapter_id),
                )
            })?
            .exercices
            .push(exercise);
        let (receipt, reloaded) = self.commit(next).await?;

        Ok(MutationOutcome {
            entity: EntityKind::Exercise,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    /// Paste into the current selection: chapters at the top level, steps
    /// into the selected chapter, exercises into the selected step
    pub async fn paste_into_selection(&mut self) -> AdminResult<MutationOutcome> {
        match self.clipboard.kind() {
            None => Err(AdminError::ClipboardEmpty),
            Some(EntityKind::Chapter) => self.paste_chapter().await,
            Some(EntityKind::Step) => {
                let chapter_id = self.store.selected_chapter_id()?;
                self.paste_step(&chapter_id).await
            }
            Some(EntityKind::Exercise) => {
                let (chapter_id, step_index) = self.store.selected_step_locator()?;
                self.paste_exercise(&chapter_id, step_index).await
            }
        }
    }

    pub async fn duplicate_chapter(&mut self, id: &str) -> AdminResult<MutationOutcome> {
        let clone = clone_chapter(self.store.require_chapter(id)?, &self.ids, DUPLICATE_SUFFIX);
        let (new_id, titre) = (clone.id.clone(), clone.titre.clone());

        let mut next = self.working_copy();
        next.push(clone);
        let (receipt, reloaded) = self.commit(next).await?;

        Ok(MutationOutcome {
            entity: EntityKind::Chapter,
            id: new_id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    /// Clone a step next to its source, in the same chapter
    pub async fn duplicate_step(
        &mut self,
        chapter_id: &str,
        index: usize,
    ) -> AdminResult<MutationOutcome> {
        let clone = clone_step(
            self.store.require_step(chapter_id, index)?,
            &self.ids,
            DUPLICATE_SUFFIX,
        );
        let (id, titre) = (clone.id.clone(), clone.titre.clone());

        let mut next = self.working_copy();
        let position = position_of(&next, chapter_id)?;
        next[position].etapes.push(clone);
        let (receipt, reloaded) = self.commit(next).await?;

        Ok(MutationOutcome {
            entity: EntityKind::Step,
            id,
            titre,
            message: receipt.message,
            reloaded,
        })
    }

    pub async fn duplicate_exercise(
        &mut self,
        locator: &ExerciseLocator,
    ) -> AdminResult<MutationOutcome> {
        let source = self.store.require_exercise(
            &locator.chapter_id,
            locator.step_index,
            locator.index,
        )?;
        let clone = clone_exercise(source, &self.ids, DUPLICATE_SUFFIX);
        let (id, titre) = (clone.id.clone(), clone.display_title());

        let mut next = self.working_copy();
        let position = position_of(&next, &locator.chapter_id)?;
        if let Some(step) = next[position].etapes.get_mut(locator.step_index) {
            step.exercices.push(clone);
        }
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

#[cfg(test)]
mod tests {
    use super::super::testing::{chapter, session};
    use super::*;
    use crate::content::{step_ids, subtree_ids};
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_copy_step_into_other_chapter() {
        let (mut session, _) = session(vec![chapter("A", 1, 2), chapter("B", 0, 0)]).await;
        let source: HashSet<String> = step_ids(session.store().find_step("A", 0).unwrap())
            .into_iter()
            .collect();

        session.copy_step("A", 0).unwrap();
        let outcome = session.paste_step("B").await.unwrap();

        let pasted = session.store().find_step("B", 0).unwrap();
        assert_eq!(pasted.exercices.len(), 2);
        assert!(pasted.titre.ends_with(" (collée)"));
        assert_eq!(outcome.id, pasted.id);
        let pasted_ids: HashSet<String> = step_ids(pasted).into_iter().collect();
        assert_eq!(pasted_ids.len(), 3);
        assert!(source.is_disjoint(&pasted_ids));

        // Repeatable: the clipboard still holds the step
        session.paste_step("B").await.unwrap();
        assert_eq!(session.store().find_chapter("B").unwrap().etapes.len(), 2);
    }

    #[tokio::test]
    async fn test_paste_errors_are_advisory() {
        let (mut session, document) = session(vec![chapter("A", 1, 1)]).await;

        let err = session.paste_chapter().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClipboardEmpty);

        session.copy_chapter("A").unwrap();
        let err = session.paste_step("A").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClipboardTypeMismatch);
        assert!(err.is_advisory());
        assert!(!document.requests().iter().any(|r| r.starts_with("POST")));
    }

    #[tokio::test]
    async fn test_duplicate_chapter_disjoint_ids() {
        let (mut session, _) = session(vec![chapter("101", 2, 3)]).await;
        let outcome = session.duplicate_chapter("101").await.unwrap();

        let source: HashSet<String> = subtree_ids(session.store().find_chapter("101").unwrap())
            .into_iter()
            .collect();
        let clone = session.store().find_chapter(&outcome.id).unwrap();
        let clone_ids: HashSet<String> = subtree_ids(clone).into_iter().collect();

        assert_eq!(clone.exercise_count(), 6);
        assert_eq!(clone.titre, "Chapitre 101 (copie)");
        assert!(source.is_disjoint(&clone_ids));
    }

    #[tokio::test]
    async fn test_duplicate_exercise_lands_in_same_step() {
        let (mut session, _) = session(vec![chapter("101", 1, 1)]).await;
        let outcome = session
            .duplicate_exercise(&ExerciseLocator::new("101", 0, 0))
            .await
            .unwrap();

        let step = session.store().find_step("101", 0).unwrap();
        assert_eq!(step.exercices.len(), 2);
        assert_eq!(step.exercices[1].id, outcome.id);
        assert_eq!(outcome.titre, "Question 0 ? (copie)");
    }

    #[tokio::test]
    async fn test_copy_selection_and_paste_into_selection() {
        let (mut session, _) = session(vec![chapter("A", 2, 1)]).await;
        let err = session.copy_selection().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NothingSelected);
        assert!(err.is_advisory());

        session.select_chapter("A").unwrap();
        session.select_step(0).unwrap();
        session.select_exercise(0).unwrap();
        session.copy_selection().unwrap();
        assert!(session.paste_availability().exercise);

        session.select_step(1).unwrap();
        let outcome = session.paste_into_selection().await.unwrap();
        assert_eq!(outcome.entity, EntityKind::Exercise);
        assert_eq!(session.store().find_step("A", 1).unwrap().exercices.len(), 2);
        assert_eq!(session.store().selection().step_index(), Some(1));
    }

    #[tokio::test]
    async fn test_paste_step_without_selected_chapter_is_advisory() {
        let (mut session, document) = session(vec![chapter("A", 1, 1)]).await;
        session.copy_step("A", 0).unwrap();

        let err = session.paste_into_selection().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NothingSelected);
        assert!(err.is_advisory());
        assert!(document.requests().iter().all(|r| r.starts_with("GET")));
        assert_eq!(session.store().find_chapter("A").unwrap().etapes.len(), 1);
    }
}
