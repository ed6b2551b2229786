//! Exercise envelope and its nine payload variants

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::EntityKind;
use crate::error::{AdminError, AdminResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Facile,
    #[default]
    Moyen,
    Difficile,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "facile" => Ok(Difficulty::Facile),
            "moyen" => Ok(Difficulty::Moyen),
            "difficile" => Ok(Difficulty::Difficile),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// One activity inside a step.
///
/// The envelope fields are shared by every variant; everything else lives in
/// [`ExercisePayload`], selected by the `type` tag on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default)]
    pub difficulte: Difficulty,
    #[serde(flatten)]
    pub payload: ExercisePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub texte: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoImage {
    pub url: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub recto: String,
    pub verso: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchItem {
    pub id: String,
    pub texte: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub gauche: String,
    pub droite: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankItem {
    pub id: String,
    pub texte: String,
    pub ordre: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub contenu: String,
    #[serde(default)]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reponse: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    #[serde(default)]
    pub cellules: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoQuestion {
    #[serde(default)]
    pub id: String,
    /// Seconds into the video
    #[serde(default)]
    pub timestamp: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExercisePayload {
    QcmUnique {
        #[serde(default)]
        reponses: Vec<String>,
        #[serde(rename = "bonneReponse", default)]
        bonne_reponse: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explication: Option<String>,
    },
    QcmMultiple {
        #[serde(default)]
        reponses: Vec<Choice>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explication: Option<String>,
    },
    Texte {
        #[serde(rename = "reponseAttendus", default)]
        reponse_attendus: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tolerance: Option<String>,
    },
    Photos {
        #[serde(default)]
        images: Vec<PhotoImage>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Flashcard {
        #[serde(default)]
        cartes: Vec<Card>,
        #[serde(rename = "langueRecto", default, skip_serializing_if = "Option::is_none")]
        langue_recto: Option<String>,
        #[serde(rename = "langueVerso", default, skip_serializing_if = "Option::is_none")]
        langue_verso: Option<String>,
    },
    #[serde(alias = "matching")]
    DragdropMatching {
        #[serde(rename = "colonneGauche", default)]
        colonne_gauche: Vec<MatchItem>,
        #[serde(rename = "colonneDroite", default)]
        colonne_droite: Vec<MatchItem>,
        #[serde(default)]
        associations: Vec<Association>,
    },
    Classement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instruction: Option<String>,
        #[serde(default)]
        items: Vec<RankItem>,
    },
    Tableau {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instruction: Option<String>,
        #[serde(default)]
        colonnes: Vec<String>,
        #[serde(default)]
        lignes: Vec<TableRow>,
    },
    #[serde(alias = "video")]
    VideoQuestions {
        #[serde(rename = "videoUrl", default)]
        video_url: String,
        #[serde(default)]
        questions: Vec<VideoQuestion>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseKind {
    QcmUnique,
    QcmMultiple,
    Texte,
    Photos,
    Flashcard,
    DragdropMatching,
    Classement,
    Tableau,
    VideoQuestions,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 9] = [
        ExerciseKind::QcmUnique,
        ExerciseKind::QcmMultiple,
        ExerciseKind::Texte,
        ExerciseKind::Photos,
        ExerciseKind::Flashcard,
        ExerciseKind::DragdropMatching,
        ExerciseKind::Classement,
        ExerciseKind::Tableau,
        ExerciseKind::VideoQuestions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::QcmUnique => "qcm_unique",
            ExerciseKind::QcmMultiple => "qcm_multiple",
            ExerciseKind::Texte => "texte",
            ExerciseKind::Photos => "photos",
            ExerciseKind::Flashcard => "flashcard",
            ExerciseKind::DragdropMatching => "dragdrop_matching",
            ExerciseKind::Classement => "classement",
            ExerciseKind::Tableau => "tableau",
            ExerciseKind::VideoQuestions => "video_questions",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        match tag.as_str() {
            "matching" => return Ok(ExerciseKind::DragdropMatching),
            "video" => return Ok(ExerciseKind::VideoQuestions),
            _ => {}
        }
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| format!("unknown exercise type '{}'", s))
    }
}

impl ExercisePayload {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            ExercisePayload::QcmUnique { .. } => ExerciseKind::QcmUnique,
            ExercisePayload::QcmMultiple { .. } => ExerciseKind::QcmMultiple,
            ExercisePayload::Texte { .. } => ExerciseKind::Texte,
            ExercisePayload::Photos { .. } => ExerciseKind::Photos,
            ExercisePayload::Flashcard { .. } => ExerciseKind::Flashcard,
            ExercisePayload::DragdropMatching { .. } => ExerciseKind::DragdropMatching,
            ExercisePayload::Classement { .. } => ExerciseKind::Classement,
            ExercisePayload::Tableau { .. } => ExerciseKind::Tableau,
            ExercisePayload::VideoQuestions { .. } => ExerciseKind::VideoQuestions,
        }
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl Exercise {
    pub fn kind(&self) -> ExerciseKind {
        self.payload.kind()
    }

    /// Title shown in listings: `titre`, else `question`, else the type tag
    pub fn display_title(&self) -> String {
        if non_blank(&self.titre) {
            return self.titre.clone().unwrap_or_default();
        }
        if non_blank(&self.question) {
            return self.question.clone().unwrap_or_default();
        }
        self.kind().to_string()
    }

    /// Check the fields each variant needs before it can be saved
    pub fn validate(&self) -> AdminResult<()> {
        let invalid = |message: &str| Err(AdminError::validation(EntityKind::Exercise, message));

        if !non_blank(&self.titre) && !non_blank(&self.question) {
            return invalid("a title or a question is required");
        }

        match &self.payload {
            ExercisePayload::QcmUnique {
                reponses,
                bonne_reponse,
                ..
            } => {
                if !non_blank(&self.question) {
                    return invalid("qcm_unique needs a question");
                }
                if reponses.len() < 2 {
                    return invalid("qcm_unique needs at least 2 answers");
                }
                if *bonne_reponse >= reponses.len() {
                    return invalid("bonneReponse must point at one of the answers");
                }
            }
            ExercisePayload::QcmMultiple { reponses, .. } => {
                if !non_blank(&self.question) {
                    return invalid("qcm_multiple needs a question");
                }
                if reponses.len() < 2 {
                    return invalid("qcm_multiple needs at least 2 answers");
                }
            }
            ExercisePayload::Texte { .. } => {
                if !non_blank(&self.question) {
                    return invalid("texte needs a question");
                }
            }
            ExercisePayload::Photos { images, .. } => {
                if images.is_empty() {
                    return invalid("photos needs at least 1 image");
                }
            }
            ExercisePayload::Flashcard { cartes, .. } => {
                if !non_blank(&self.titre) {
                    return invalid("flashcard needs a title");
                }
                if cartes.is_empty() {
                    return invalid("flashcard needs at least 1 card");
                }
            }
            ExercisePayload::DragdropMatching {
                colonne_gauche,
                colonne_droite,
                ..
            } => {
                if colonne_gauche.is_empty() || colonne_droite.is_empty() {
                    return invalid("matching needs items in both columns");
                }
                if colonne_gauche.len() != colonne_droite.len() {
                    return invalid("matching columns must have the same length");
                }
            }
            ExercisePayload::Classement { instruction, items } => {
                if !non_blank(instruction) {
                    return invalid("classement needs an instruction");
                }
                if items.len() < 2 {
                    return invalid("classement needs at least 2 items");
                }
            }
            ExercisePayload::Tableau {
                instruction,
                colonnes,
                ..
            } => {
                if !non_blank(instruction) {
                    return invalid("tableau needs an instruction");
                }
                if colonnes.len() < 2 {
                    return invalid("tableau needs at least 2 columns");
                }
            }
            ExercisePayload::VideoQuestions { video_url, .. } => {
                if video_url.trim().is_empty() {
                    return invalid("video_questions needs a videoUrl");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_selects_variant() {
        let exercise: Exercise = serde_json::from_value(json!({
            "id": "x1",
            "type": "qcm_unique",
            "question": "Qu'est-ce que la douane?",
            "reponses": ["Un service public", "Une entreprise privée"],
            "bonneReponse": 0,
            "difficulte": "facile"
        }))
        .unwrap();

        assert_eq!(exercise.kind(), ExerciseKind::QcmUnique);
        assert_eq!(exercise.difficulte, Difficulty::Facile);
        assert!(exercise.validate().is_ok());

        let back = serde_json::to_value(&exercise).unwrap();
        assert_eq!(back["type"], "qcm_unique");
        assert_eq!(back["bonneReponse"], 0);
    }

    #[test]
    fn test_legacy_matching_tag_is_accepted() {
        let exercise: Exercise = serde_json::from_value(json!({
            "id": "x2",
            "type": "matching",
            "titre": "Associer",
            "colonneGauche": [{"id": "t1", "texte": "Tarif"}],
            "colonneDroite": [{"id": "d1", "texte": "Droit douanier"}],
            "associations": [{"gauche": "t1", "droite": "d1"}]
        }))
        .unwrap();

        assert_eq!(exercise.kind(), ExerciseKind::DragdropMatching);
        assert_eq!(exercise.difficulte, Difficulty::Moyen);
        assert_eq!(
            serde_json::to_value(&exercise).unwrap()["type"],
            "dragdrop_matching"
        );
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let parsed = serde_json::from_value::<Exercise>(json!({"id": "x", "type": "sudoku"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display_title_fallbacks() {
        let mut exercise: Exercise = serde_json::from_value(json!({
            "id": "x", "type": "photos", "images": [{"url": "a.png"}]
        }))
        .unwrap();
        assert_eq!(exercise.display_title(), "photos");

        exercise.question = Some("Que voyez-vous?".into());
        assert_eq!(exercise.display_title(), "Que voyez-vous?");

        exercise.titre = Some("Photos du port".into());
        assert_eq!(exercise.display_title(), "Photos du port");
    }

    #[test]
    fn test_validation_rules() {
        let qcm_one_answer: Exercise = serde_json::from_value(json!({
            "type": "qcm_unique", "question": "Q", "reponses": ["A"], "bonneReponse": 0
        }))
        .unwrap();
        assert!(matches!(
            qcm_one_answer.validate(),
            Err(AdminError::Validation { .. })
        ));

        let lopsided: Exercise = serde_json::from_value(json!({
            "type": "dragdrop_matching", "titre": "M",
            "colonneGauche": [{"id": "a", "texte": "A"}, {"id": "b", "texte": "B"}],
            "colonneDroite": [{"id": "1", "texte": "1"}]
        }))
        .unwrap();
        assert!(lopsided.validate().is_err());

        let untitled: Exercise = serde_json::from_value(json!({
            "type": "video_questions", "videoUrl": "https://example.org/v.mp4"
        }))
        .unwrap();
        assert!(untitled.validate().is_err());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("flashcard".parse::<ExerciseKind>(), Ok(ExerciseKind::Flashcard));
        assert_eq!("matching".parse::<ExerciseKind>(), Ok(ExerciseKind::DragdropMatching));
        assert!("essay".parse::<ExerciseKind>().is_err());
    }
}
