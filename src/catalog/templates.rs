use serde::Deserialize;
use serde_json::{Map, Value};

use crate::content::{EntityKind, Exercise, ExerciseKind};
use crate::error::{AdminError, AdminResult};

/// A named example payload for one exercise type
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub description: String,
    pub template: Map<String, Value>,
}

impl ExerciseTemplate {
    pub fn kind(&self) -> Option<ExerciseKind> {
        self.type_tag.parse().ok()
    }

    /// Exercise pre-filled from the template. The id stays empty: the server
    /// assigns one when the exercise is created.
    pub fn to_exercise(&self) -> AdminResult<Exercise> {
        let mut fields = self.template.clone();
        fields.insert("type".to_string(), Value::String(self.type_tag.clone()));
        fields.insert("id".to_string(), Value::String(String::new()));

        serde_json::from_value(Value::Object(fields)).map_err(|e| {
            AdminError::validation(
                EntityKind::Exercise,
                format!("template '{}' does not describe an exercise: {}", self.name, e),
            )
        })
    }
}
