use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::exercise::Exercise;
use super::ids::IdGenerator;
use super::level::{Level, classify_level};

/// Top-level content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    #[serde(default)]
    pub titre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niveau: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordre: Option<u32>,
    #[serde(default)]
    pub etapes: Vec<Step>,
}

impl Chapter {
    pub fn new(id: impl Into<String>, titre: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            titre: titre.into(),
            description: None,
            niveau: None,
            ordre: None,
            etapes: Vec::new(),
        }
    }

    pub fn level(&self) -> Level {
        classify_level(&self.id)
    }

    pub fn exercise_count(&self) -> usize {
        self.etapes.iter().map(|step| step.exercices.len()).sum()
    }

    /// Give the chapter and every step/exercise below it a new id
    pub fn regenerate_ids(&mut self, ids: &IdGenerator) {
        self.id = ids.next_id();
        for step in &mut self.etapes {
            step.regenerate_ids(ids);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Diagnostic,
    Apprentissage,
    Entrainement,
    Evaluation,
    #[default]
    Standard,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Diagnostic => "diagnostic",
            StepType::Apprentissage => "apprentissage",
            StepType::Entrainement => "entrainement",
            StepType::Evaluation => "evaluation",
            StepType::Standard => "standard",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diagnostic" => Ok(StepType::Diagnostic),
            "apprentissage" => Ok(StepType::Apprentissage),
            "entrainement" => Ok(StepType::Entrainement),
            "evaluation" => Ok(StepType::Evaluation),
            "standard" => Ok(StepType::Standard),
            other => Err(format!("unknown step type '{}'", other)),
        }
    }
}

fn default_duree() -> u32 {
    30
}

/// Ordered phase within a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub titre: String,
    #[serde(rename = "type", default)]
    pub step_type: StepType,
    /// Minutes
    #[serde(default = "default_duree")]
    pub duree: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub exercices: Vec<Exercise>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Step {
    pub fn new(id: impl Into<String>, titre: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            titre: titre.into(),
            step_type: StepType::default(),
            duree: default_duree(),
            description: None,
            exercices: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn regenerate_ids(&mut self, ids: &IdGenerator) {
        self.id = ids.next_id();
        for exercise in &mut self.exercices {
            exercise.id = ids.next_id();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_defaults_when_fields_missing() {
        let step: Step = serde_json::from_str(r#"{"id":"e1","titre":"Intro"}"#).unwrap();
        assert_eq!(step.step_type, StepType::Standard);
        assert_eq!(step.duree, 30);
        assert!(step.exercices.is_empty());
        assert!(step.created_at.is_none());
    }

    #[test]
    fn test_chapter_keeps_wire_names() {
        let mut chapter = Chapter::new("101", "Tarifs");
        chapter.niveau = Some("N2".to_string());
        let mut step = Step::new("e1", "Diagnostic");
        step.step_type = StepType::Diagnostic;
        chapter.etapes.push(step);

        let json = serde_json::to_value(&chapter).unwrap();
        assert_eq!(json["niveau"], "N2");
        assert_eq!(json["etapes"][0]["type"], "diagnostic");
        assert!(json["etapes"][0]["createdAt"].is_string());
        assert!(json.get("description").is_none());
        assert_eq!(chapter.level(), Level::N2);
    }

    #[test]
    fn test_regenerate_ids_touches_whole_subtree() {
        let json = r#"{"id":"c","titre":"T","etapes":[{"id":"s","titre":"S","exercices":[
            {"id":"x1","type":"texte","question":"Q"},{"id":"x2","type":"texte","question":"Q"}]}]}"#;
        let mut chapter: Chapter = serde_json::from_str(json).unwrap();
        chapter.regenerate_ids(&IdGenerator::with_prefix("t"));

        assert!(chapter.id.starts_with("t_"));
        assert!(chapter.etapes[0].id.starts_with("t_"));
        assert!(chapter.etapes[0].exercices.iter().all(|x| x.id.starts_with("t_")));
    }
}
