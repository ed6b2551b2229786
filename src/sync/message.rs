use log::debug;
use serde::{Deserialize, Serialize};

/// Message exchanged between sessions when the chapter tree changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    #[serde(rename = "CHAPTERS_UPDATED")]
    ChaptersUpdated {
        /// Unix millis
        timestamp: i64,
        #[serde(rename = "chapitresCount")]
        chapitres_count: usize,
        source: String,
    },
}

impl ChangeEvent {
    pub fn chapters_updated(count: usize, source: impl Into<String>) -> Self {
        ChangeEvent::ChaptersUpdated {
            timestamp: chrono::Utc::now().timestamp_millis(),
            chapitres_count: count,
            source: source.into(),
        }
    }

    pub fn to_json(&self) -> String {
        // Only plain strings and integers inside; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a channel message; unknown `type` values and garbage yield `None`
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!("Ignoring channel message ({}): {}", e, text);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let event = ChangeEvent::ChaptersUpdated {
            timestamp: 1_700_000_000_000,
            chapitres_count: 12,
            source: "admin.html".to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(value["type"], "CHAPTERS_UPDATED");
        assert_eq!(value["chapitresCount"], 12);
        assert_eq!(value["source"], "admin.html");
        assert_eq!(ChangeEvent::parse(&event.to_json()), Some(event));
    }

    #[test]
    fn test_foreign_messages_are_ignored() {
        assert_eq!(ChangeEvent::parse(r#"{"type":"USER_LOGGED_IN"}"#), None);
        assert_eq!(ChangeEvent::parse("ping"), None);
    }
}
