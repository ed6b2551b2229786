//! Content-tree data model: chapters, steps, exercises and level buckets

pub mod chapter;
pub mod exercise;
pub mod ids;
pub mod level;

pub use chapter::{Chapter, Step, StepType};
pub use exercise::{Difficulty, Exercise, ExerciseKind, ExercisePayload};
pub use ids::IdGenerator;
pub use level::{Level, classify_level};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three identifiable levels of the tree below a [`Level`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "chapitre")]
    Chapter,
    #[serde(rename = "etape")]
    Step,
    #[serde(rename = "exercice")]
    Exercise,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Chapter => f.write_str("chapter"),
            EntityKind::Step => f.write_str("step"),
            EntityKind::Exercise => f.write_str("exercise"),
        }
    }
}

/// Number of identifiable entities in a chapter subtree (the chapter, its steps, their exercises)
pub fn subtree_size(chapter: &Chapter) -> usize {
    1 + chapter
        .etapes
        .iter()
        .map(|step| 1 + step.exercices.len())
        .sum::<usize>()
}

/// Every entity id in a chapter subtree
pub fn subtree_ids(chapter: &Chapter) -> Vec<String> {
    let mut ids = vec![chapter.id.clone()];
    for step in &chapter.etapes {
        ids.extend(step_ids(step));
    }
    ids
}

/// Every entity id in a step subtree
pub fn step_ids(step: &Step) -> Vec<String> {
    let mut ids = vec![step.id.clone()];
    ids.extend(step.exercices.iter().map(|exercise| exercise.id.clone()));
    ids
}
