use serde::Deserialize;

use crate::content::{Chapter, IdGenerator};

/// A prebuilt chapter used to seed new content
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterTheme {
    pub name: String,
    pub description: String,
    pub chapitres: Vec<Chapter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSummary {
    pub steps: usize,
    pub exercises: usize,
}

impl ChapterTheme {
    pub fn source_chapter(&self) -> Option<&Chapter> {
        self.chapitres.first()
    }

    pub fn summary(&self) -> ThemeSummary {
        self.source_chapter()
            .map(|chapter| ThemeSummary {
                steps: chapter.etapes.len(),
                exercises: chapter.exercise_count(),
            })
            .unwrap_or(ThemeSummary {
                steps: 0,
                exercises: 0,
            })
    }

    /// Fresh chapter built from the theme: new ids everywhere, the title
    /// stamped with `year`, placed at `ordre`.
    pub fn instantiate(
        &self,
        ids: &IdGenerator,
        year: i32,
        ordre: u32,
        niveau: Option<String>,
    ) -> Option<Chapter> {
        let mut chapter = self.source_chapter()?.clone();
        chapter.regenerate_ids(ids);
        chapter.titre = format!("{} - {}", chapter.titre, year);
        chapter.ordre = Some(ordre);
        chapter.niveau = niveau;
        for step in &mut chapter.etapes {
            step.created_at = Some(chrono::Utc::now());
        }
        Some(chapter)
    }
}
