use crate::content::Level;

/// Transient "what is the user looking at" cursor.
///
/// Deeper selections never outlive a change of their ancestor: picking a
/// level clears the chapter, picking a chapter clears the step, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    level: Option<Level>,
    chapter_id: Option<String>,
    chapter_index: Option<usize>,
    step_index: Option<usize>,
    exercise_index: Option<usize>,
}

impl Selection {
    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn chapter_id(&self) -> Option<&str> {
        self.chapter_id.as_deref()
    }

    /// Position of the selected chapter in the collection
    pub fn chapter_index(&self) -> Option<usize> {
        self.chapter_index
    }

    pub fn step_index(&self) -> Option<usize> {
        self.step_index
    }

    pub fn exercise_index(&self) -> Option<usize> {
        self.exercise_index
    }

    pub fn has_chapter(&self) -> bool {
        self.chapter_id.is_some()
    }

    pub fn has_step(&self) -> bool {
        self.step_index.is_some()
    }

    pub(crate) fn set_level(&mut self, level: Level) {
        self.level = Some(level);
        self.clear_chapter();
    }

    pub(crate) fn set_chapter(&mut self, level: Level, id: &str, index: usize) {
        self.level = Some(level);
        self.chapter_id = Some(id.to_string());
        self.chapter_index = Some(index);
        self.clear_step();
    }

    pub(crate) fn set_step(&mut self, index: usize) {
        self.step_index = Some(index);
        self.exercise_index = None;
    }

    pub(crate) fn set_exercise(&mut self, index: usize) {
        self.exercise_index = Some(index);
    }

    /// Re-point the chapter after a reload moved it
    pub(crate) fn relocate_chapter(&mut self, index: usize) {
        self.chapter_index = Some(index);
    }

    pub(crate) fn clear_chapter(&mut self) {
        self.chapter_id = None;
        self.chapter_index = None;
        self.clear_step();
    }

    pub(crate) fn clear_step(&mut self) {
        self.step_index = None;
        self.exercise_index = None;
    }

    pub(crate) fn clear_exercise(&mut self) {
        self.exercise_index = None;
    }

    pub(crate) fn clear(&mut self) {
        *self = Selection::default();
    }
}
