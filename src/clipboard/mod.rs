//! Single-slot clipboard for chapters, steps and exercises
//!
//! Copy stores a deep clone. Paste never consumes the slot; each paste hands
//! out a fresh clone whose ids (and those of every descendant) are new.

use chrono::Utc;
use log::debug;

use crate::content::{Chapter, EntityKind, Exercise, IdGenerator, Step};
use crate::error::{AdminError, AdminResult};
use crate::store::Selection;

pub const DUPLICATE_SUFFIX: &str = " (copie)";
pub const PASTED_SUFFIX: &str = " (collé)";
pub const PASTED_STEP_SUFFIX: &str = " (collée)";

#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardEntry {
    Chapter(Chapter),
    Step(Step),
    Exercise(Exercise),
}

impl ClipboardEntry {
    pub fn kind(&self) -> EntityKind {
        match self {
            ClipboardEntry::Chapter(_) => EntityKind::Chapter,
            ClipboardEntry::Step(_) => EntityKind::Step,
            ClipboardEntry::Exercise(_) => EntityKind::Exercise,
        }
    }

    /// Human label, e.g. `Intro (2 exercices)`
    pub fn label(&self) -> String {
        match self {
            ClipboardEntry::Chapter(chapter) => {
                format!("{} ({} étapes)", chapter.titre, chapter.etapes.len())
            }
            ClipboardEntry::Step(step) => {
                format!("{} ({} exercices)", step.titre, step.exercices.len())
            }
            ClipboardEntry::Exercise(exercise) => exercise.display_title(),
        }
    }
}

/// Which paste actions the current slot and selection allow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasteAvailability {
    pub chapter: bool,
    pub step: bool,
    pub exercise: bool,
}

impl PasteAvailability {
    pub fn any(&self) -> bool {
        self.chapter || self.step || self.exercise
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites whatever was copied before
    pub fn copy(&mut self, entry: ClipboardEntry) {
        debug!("Copied {} to clipboard: {}", entry.kind(), entry.label());
        self.slot = Some(entry);
    }

    pub fn peek(&self) -> Option<&ClipboardEntry> {
        self.slot.as_ref()
    }

    pub fn kind(&self) -> Option<EntityKind> {
        self.slot.as_ref().map(ClipboardEntry::kind)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    fn require(&self, expected: EntityKind) -> AdminResult<&ClipboardEntry> {
        let entry = self.slot.as_ref().ok_or(AdminError::ClipboardEmpty)?;
        if entry.kind() != expected {
            return Err(AdminError::ClipboardTypeMismatch {
                expected,
                found: entry.kind(),
            });
        }
        Ok(entry)
    }

    pub fn paste_chapter(&self, ids: &IdGenerator) -> AdminResult<Chapter> {
        match self.require(EntityKind::Chapter)? {
            ClipboardEntry::Chapter(chapter) => Ok(clone_chapter(chapter, ids, PASTED_SUFFIX)),
            other => Err(mismatch(EntityKind::Chapter, other)),
        }
    }

    pub fn paste_step(&self, ids: &IdGenerator) -> AdminResult<Step> {
        match self.require(EntityKind::Step)? {
            ClipboardEntry::Step(step) => Ok(clone_step(step, ids, PASTED_STEP_SUFFIX)),
            other => Err(mismatch(EntityKind::Step, other)),
        }
    }

    pub fn paste_exercise(&self, ids: &IdGenerator) -> AdminResult<Exercise> {
        match self.require(EntityKind::Exercise)? {
            ClipboardEntry::Exercise(exercise) => {
                Ok(clone_exercise(exercise, ids, PASTED_SUFFIX))
            }
            other => Err(mismatch(EntityKind::Exercise, other)),
        }
    }

    pub fn availability(&self, selection: &Selection) -> PasteAvailability {
        match self.kind() {
            Some(EntityKind::Chapter) => PasteAvailability {
                chapter: true,
                ..Default::default()
            },
            Some(EntityKind::Step) => PasteAvailability {
                step: selection.has_chapter(),
                ..Default::default()
            },
            Some(EntityKind::Exercise) => PasteAvailability {
                exercise: selection.has_chapter() && selection.has_step(),
                ..Default::default()
            },
            None => PasteAvailability::default(),
        }
    }
}

fn mismatch(expected: EntityKind, entry: &ClipboardEntry) -> AdminError {
    AdminError::ClipboardTypeMismatch {
        expected,
        found: entry.kind(),
    }
}

pub fn clone_chapter(source: &Chapter, ids: &IdGenerator, suffix: &str) -> Chapter {
    let mut clone = source.clone();
    clone.regenerate_ids(ids);
    clone.titre = format!("{}{}", source.titre, suffix);
    clone
}

pub fn clone_step(source: &Step, ids: &IdGenerator, suffix: &str) -> Step {
    let mut clone = source.clone();
    clone.regenerate_ids(ids);
    clone.titre = format!("{}{}", source.titre, suffix);
    clone.created_at = Some(Utc::now());
    clone
}

pub fn clone_exercise(source: &Exercise, ids: &IdGenerator, suffix: &str) -> Exercise {
    let mut clone = source.clone();
    clone.id = ids.next_id();
    clone.titre = Some(format!("{}{}", source.display_title(), suffix));
    clone
}
