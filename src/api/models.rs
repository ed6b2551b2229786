//! Request and response bodies of the chapter document API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{Chapter, Exercise};

/// Body of `POST /chapters`
#[derive(Debug, Serialize)]
pub struct ChaptersBody<'a> {
    pub chapitres: &'a [Chapter],
}

/// `{ success, message?, error? }` envelope returned by write endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// An empty body from a write endpoint counts as success
impl Default for ApiEnvelope {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
        }
    }
}

impl ApiEnvelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Best human-readable explanation carried by the envelope
    pub fn reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "no reason given".to_string())
    }
}

/// Body of `POST /steps/{stepId}/exercises`: the server assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExerciseBody {
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub titre: String,
    pub content: Value,
}

impl NewExerciseBody {
    /// Split an exercise into tag, title and the remaining payload
    pub fn from_exercise(exercise: &Exercise) -> serde_json::Result<Self> {
        let mut content = serde_json::to_value(exercise)?;
        if let Value::Object(map) = &mut content {
            map.remove("id");
            map.remove("type");
            map.remove("titre");
        }
        Ok(Self {
            exercise_type: exercise.kind().to_string(),
            titre: exercise.display_title(),
            content,
        })
    }

    /// Reassemble the stored exercise shape with a server-assigned id
    pub fn into_exercise_value(self, id: &str) -> Value {
        let mut value = match self.content {
            Value::Object(map) => Value::Object(map),
            _ => Value::Object(Default::default()),
        };
        if let Value::Object(map) = &mut value {
            map.insert("id".to_string(), Value::String(id.to_string()));
            map.insert("type".to_string(), Value::String(self.exercise_type));
            map.insert("titre".to_string(), Value::String(self.titre));
        }
        value
    }
}
