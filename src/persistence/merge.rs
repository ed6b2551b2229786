use serde_json::Value;
use std::collections::HashSet;

use crate::content::Chapter;

/// Union on chapter id: every remote chapter, then cached chapters the remote
/// does not know. On a shared id the remote copy wins and the cached one is
/// dropped, so offline edits to a chapter that also exists remotely are lost.
pub fn merge_with_local_cache(remote: Vec<Chapter>, cached: Vec<Chapter>) -> Vec<Chapter> {
    let mut seen: HashSet<String> = remote.iter().map(|chapter| chapter.id.clone()).collect();
    let mut merged = remote;

    for chapter in cached {
        if seen.insert(chapter.id.clone()) {
            merged.push(chapter);
        }
    }

    merged
}

/// Accept `{chapitres: [...]}` or a bare array
pub fn parse_chapter_document(document: Value) -> Result<Vec<Chapter>, String> {
    let list = match document {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove("chapitres") {
            Some(list @ Value::Array(_)) => list,
            Some(_) => return Err("'chapitres' is not an array".to_string()),
            None => return Err("object has no 'chapitres' array".to_string()),
        },
        other => {
            return Err(format!(
                "expected an array or an object with 'chapitres', got {}",
                json_type(&other)
            ));
        }
    };

    serde_json::from_value(list).map_err(|e| format!("malformed chapter: {}", e))
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
