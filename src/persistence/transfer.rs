//! Snapshot documents for export and import

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;

use super::merge::json_type;
use crate::content::Chapter;
use crate::error::{AdminError, AdminResult};

/// Outcome of an import: what was added and what collided with existing ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub skipped: Vec<String>,
}

impl ImportReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }
}

/// `chapitres_export_YYYY-MM-DD.json`
pub fn default_export_name(date: NaiveDate) -> String {
    format!("chapitres_export_{}.json", date.format("%Y-%m-%d"))
}

/// Pretty JSON array of chapters
pub fn render_export(chapters: &[Chapter]) -> AdminResult<String> {
    serde_json::to_string_pretty(chapters)
        .map_err(|e| AdminError::InvalidFormat(format!("could not serialize export: {}", e)))
}

/// Parse an uploaded document; the top level must be an array of chapters
pub fn parse_import(content: &str) -> AdminResult<Vec<Chapter>> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| AdminError::InvalidFormat(format!("not JSON: {}", e)))?;

    if !document.is_array() {
        return Err(AdminError::InvalidFormat(format!(
            "expected an array of chapters, got {}",
            json_type(&document)
        )));
    }

    serde_json::from_value(document)
        .map_err(|e| AdminError::InvalidFormat(format!("malformed chapter: {}", e)))
}

/// Keep imported chapters whose id is new, in document order; first occurrence wins
pub fn split_new_chapters(
    existing: &[Chapter],
    imported: Vec<Chapter>,
) -> (Vec<Chapter>, ImportReport) {
    let mut known: HashSet<String> = existing.iter().map(|c| c.id.clone()).collect();
    let mut fresh = Vec::new();
    let mut report = ImportReport::default();

    for chapter in imported {
        if known.insert(chapter.id.clone()) {
            report.imported.push(chapter.id.clone());
            fresh.push(chapter);
        } else {
            report.skipped.push(chapter.id);
        }
    }

    (fresh, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(default_export_name(date), "chapitres_export_2025-03-07.json");
    }

    #[test]
    fn test_import_requires_top_level_array() {
        let wrapped = r#"{"chapitres": [{"id": "a", "titre": "A"}]}"#;
        assert!(matches!(parse_import(wrapped), Err(AdminError::InvalidFormat(_))));
        assert!(matches!(parse_import("{oops"), Err(AdminError::InvalidFormat(_))));
        assert_eq!(parse_import(r#"[{"id": "a", "titre": "A"}]"#).unwrap().len(), 1);
    }

    #[test]
    fn test_export_is_pretty_and_readable_back() {
        let rendered = render_export(&[Chapter::new("a", "A")]).unwrap();
        assert!(rendered.starts_with("[\n"));
        assert_eq!(parse_import(&rendered).unwrap()[0].id, "a");
    }

    #[test]
    fn test_split_new_chapters() {
        let existing = vec![Chapter::new("a", "A")];
        let imported = vec![
            Chapter::new("a", "A bis"),
            Chapter::new("b", "B"),
            Chapter::new("b", "B bis"),
        ];

        let (fresh, report) = split_new_chapters(&existing, imported);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].titre, "B");
        assert_eq!(report.imported, vec!["b"]);
        assert_eq!(report.skipped, vec!["a", "b"]);
    }
}
