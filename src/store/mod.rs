//! In-memory content tree with level grouping, id index and selection cursor
//!
//! The store is only ever replaced wholesale (after a confirmed save or an
//! explicit cache fallback). Mutation of the tree itself goes through
//! `AdminSession`, which computes a new collection, persists it and then
//! hands it back here.

pub mod selection;

pub use selection::Selection;

use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::content::{Chapter, EntityKind, Exercise, ExerciseKind, Level, Step, classify_level};
use crate::error::{AdminError, AdminResult};

/// Where the current tree came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSource {
    Empty,
    Remote,
    LocalCache,
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    chapters: Vec<Chapter>,
    levels: BTreeMap<Level, Vec<String>>,
    by_id: HashMap<String, usize>,
    selection: Selection,
    source: TreeSource,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            chapters: Vec::new(),
            levels: BTreeMap::new(),
            by_id: HashMap::new(),
            selection: Selection::default(),
            source: TreeSource::Empty,
        }
    }

    /// Swap in a new collection and rebuild every derived index
    pub fn replace(&mut self, chapters: Vec<Chapter>, source: TreeSource) {
        self.chapters = chapters;
        self.source = source;
        self.rebuild_indices();
        self.prune_selection();
        debug!(
            "Store now holds {} chapters ({:?})",
            self.chapters.len(),
            self.source
        );
    }

    fn rebuild_indices(&mut self) {
        self.levels.clear();
        self.by_id.clear();
        for level in Level::ALL {
            self.levels.insert(level, Vec::new());
        }
        for (index, chapter) in self.chapters.iter().enumerate() {
            self.by_id.insert(chapter.id.clone(), index);
            self.levels
                .entry(classify_level(&chapter.id))
                .or_default()
                .push(chapter.id.clone());
        }
    }

    fn prune_selection(&mut self) {
        let Some(chapter_id) = self.selection.chapter_id().map(str::to_string) else {
            return;
        };
        let Some(&index) = self.by_id.get(&chapter_id) else {
            self.selection.clear_chapter();
            return;
        };
        self.selection.relocate_chapter(index);

        let steps = &self.chapters[index].etapes;
        match self.selection.step_index() {
            Some(step) if step >= steps.len() => self.selection.clear_step(),
            Some(step) => {
                if let Some(exercise) = self.selection.exercise_index() {
                    if exercise >= steps[step].exercices.len() {
                        self.selection.clear_exercise();
                    }
                }
            }
            None => {}
        }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn source(&self) -> TreeSource {
        self.source
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn contains_chapter(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    // Lookups return None for "not found"; callers report it with require_*.

    pub fn find_chapter(&self, id: &str) -> Option<&Chapter> {
        self.by_id.get(id).map(|&index| &self.chapters[index])
    }

    pub fn chapter_index(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn find_step(&self, chapter_id: &str, index: usize) -> Option<&Step> {
        self.find_chapter(chapter_id)?.etapes.get(index)
    }

    pub fn find_exercise(
        &self,
        chapter_id: &str,
        step_index: usize,
        index: usize,
    ) -> Option<&Exercise> {
        self.find_step(chapter_id, step_index)?.exercices.get(index)
    }

    pub fn require_chapter(&self, id: &str) -> AdminResult<&Chapter> {
        self.find_chapter(id)
            .ok_or_else(|| AdminError::not_found(EntityKind::Chapter, format!("chapter {}", id)))
    }

    pub fn require_step(&self, chapter_id: &str, index: usize) -> AdminResult<&Step> {
        self.require_chapter(chapter_id)?
            .etapes
            .get(index)
            .ok_or_else(|| {
                AdminError::not_found(
                    EntityKind::Step,
                    format!("step {} of chapter {}", index, chapter_id),
                )
            })
    }

    pub fn require_exercise(
        &self,
        chapter_id: &str,
        step_index: usize,
        index: usize,
    ) -> AdminResult<&Exercise> {
        self.require_step(chapter_id, step_index)?
            .exercices
            .get(index)
            .ok_or_else(|| {
                AdminError::not_found(
                    EntityKind::Exercise,
                    format!(
                        "exercise {} of step {} in chapter {}",
                        index, step_index, chapter_id
                    ),
                )
            })
    }

    /// Chapters of one level in display order (`ordre` first, then insertion order)
    pub fn chapters_in_level(&self, level: Level) -> Vec<&Chapter> {
        let mut chapters: Vec<&Chapter> = self
            .levels
            .get(&level)
            .map(|ids| ids.iter().filter_map(|id| self.find_chapter(id)).collect())
            .unwrap_or_default();
        chapters.sort_by_key(|chapter| chapter.ordre.unwrap_or(u32::MAX));
        chapters
    }

    /// Chapter count per level, always listing N1..N4
    pub fn level_summary(&self) -> Vec<(Level, usize)> {
        Level::ALL
            .into_iter()
            .map(|level| (level, self.levels.get(&level).map_or(0, Vec::len)))
            .collect()
    }

    /// Exercises of a step with their positions, optionally keeping one type
    pub fn exercises_of(
        &self,
        chapter_id: &str,
        step_index: usize,
        filter: Option<ExerciseKind>,
    ) -> AdminResult<Vec<(usize, &Exercise)>> {
        let step = self.require_step(chapter_id, step_index)?;
        Ok(step
            .exercices
            .iter()
            .enumerate()
            .filter(|(_, exercise)| filter.is_none_or(|kind| exercise.kind() == kind))
            .collect())
    }

    pub fn select_level(&mut self, level: Level) {
        self.selection.set_level(level);
    }

    pub fn select_chapter(&mut self, id: &str) -> AdminResult<()> {
        let index = self
            .chapter_index(id)
            .ok_or_else(|| AdminError::not_found(EntityKind::Chapter, format!("chapter {}", id)))?;
        self.selection.set_chapter(classify_level(id), id, index);
        Ok(())
    }

    /// Only valid once a chapter is selected
    pub fn select_step(&mut self, index: usize) -> AdminResult<()> {
        let chapter_id = self.selected_chapter_id()?;
        self.require_step(&chapter_id, index)?;
        self.selection.set_step(index);
        Ok(())
    }

    pub fn select_exercise(&mut self, index: usize) -> AdminResult<()> {
        let (chapter_id, step_index) = self.selected_step_locator()?;
        self.require_exercise(&chapter_id, step_index, index)?;
        self.selection.set_exercise(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_chapter_id(&self) -> AdminResult<String> {
        self.selection
            .chapter_id()
            .map(str::to_string)
            .ok_or_else(|| AdminError::nothing_selected(EntityKind::Chapter))
    }

    pub fn selected_step_locator(&self) -> AdminResult<(String, usize)> {
        let chapter_id = self.selected_chapter_id()?;
        let step_index = self
            .selection
            .step_index()
            .ok_or_else(|| AdminError::nothing_selected(EntityKind::Step))?;
        Ok((chapter_id, step_index))
    }

    pub fn selected_exercise_locator(&self) -> AdminResult<(String, usize, usize)> {
        let (chapter_id, step_index) = self.selected_step_locator()?;
        let index = self
            .selection
            .exercise_index()
            .ok_or_else(|| AdminError::nothing_selected(EntityKind::Exercise))?;
        Ok((chapter_id, step_index, index))
    }
}
