//! Static exercise templates and chapter themes
//!
//! Both tables ship embedded in the binary and are parsed on first use.

pub mod templates;
pub mod themes;

pub use templates::ExerciseTemplate;
pub use themes::{ChapterTheme, ThemeSummary};

use once_cell::sync::OnceCell;

use crate::content::{EntityKind, Exercise, ExerciseKind};
use crate::error::{AdminError, AdminResult};

const TEMPLATES_JSON: &str = include_str!("data/templates.json");
const THEMES_JSON: &str = include_str!("data/themes.json");

static TEMPLATES: OnceCell<Vec<ExerciseTemplate>> = OnceCell::new();
static THEMES: OnceCell<Vec<ChapterTheme>> = OnceCell::new();

fn corrupt(table: &str, e: serde_json::Error) -> AdminError {
    AdminError::InvalidFormat(format!("embedded {} table: {}", table, e))
}

pub fn templates() -> AdminResult<&'static [ExerciseTemplate]> {
    TEMPLATES
        .get_or_try_init(|| serde_json::from_str(TEMPLATES_JSON).map_err(|e| corrupt("template", e)))
        .map(Vec::as_slice)
}

/// Templates of one exercise type, with their catalog index
pub fn templates_of_kind(kind: ExerciseKind) -> AdminResult<Vec<(usize, &'static ExerciseTemplate)>> {
    Ok(templates()?
        .iter()
        .enumerate()
        .filter(|(_, template)| template.kind() == Some(kind))
        .collect())
}

pub fn template(index: usize) -> AdminResult<&'static ExerciseTemplate> {
    templates()?
        .get(index)
        .ok_or_else(|| AdminError::not_found(EntityKind::Exercise, format!("template #{}", index)))
}

/// Payload skeleton for the create-exercise form; nothing is persisted
pub fn instantiate_template(index: usize) -> AdminResult<Exercise> {
    template(index)?.to_exercise()
}

pub fn themes() -> AdminResult<&'static [ChapterTheme]> {
    THEMES
        .get_or_try_init(|| serde_json::from_str(THEMES_JSON).map_err(|e| corrupt("theme", e)))
        .map(Vec::as_slice)
}

pub fn theme(index: usize) -> AdminResult<&'static ChapterTheme> {
    themes()?
        .get(index)
        .ok_or_else(|| AdminError::not_found(EntityKind::Chapter, format!("theme #{}", index)))
}
