//! Shared fixtures for the integration tests

#![allow(dead_code)]

use lms_admin::admin::AdminSession;
use lms_admin::api::InMemoryDocument;
use lms_admin::config::Config;
use lms_admin::content::{Chapter, IdGenerator};
use lms_admin::persistence::PersistenceGateway;
use serde_json::json;
use std::sync::Arc;

/// Chapter `id` with `steps` steps of `exercises` text exercises each.
/// Step ids are `{id}-s{n}`, exercise ids `{id}-s{n}-x{m}`.
pub fn chapter(id: &str, steps: usize, exercises: usize) -> Chapter {
    let value = json!({
        "id": id,
        "titre": format!("Chapitre {}", id),
        "niveau": "N1",
        "etapes": (0..steps).map(|s| json!({
            "id": format!("{}-s{}", id, s),
            "titre": format!("Etape {}", s),
            "type": "apprentissage",
            "duree": 20,
            "exercices": (0..exercises).map(|e| json!({
                "id": format!("{}-s{}-x{}", id, s, e),
                "type": "texte",
                "question": format!("Question {} ?", e),
                "reponseAttendus": ["Réponse"],
            })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    });
    serde_json::from_value(value).expect("fixture chapter")
}

pub async fn gateway(document: &InMemoryDocument, config: &Config) -> PersistenceGateway {
    PersistenceGateway::new(Arc::new(document.clone()), config.local_cache())
}

/// Loaded session over an in-memory remote document and an in-memory cache
pub async fn session(chapters: Vec<Chapter>) -> (AdminSession, InMemoryDocument, Config) {
    let document = InMemoryDocument::new(chapters);
    let config = Config::new_test().await.expect("test config");
    let mut session =
        AdminSession::with_ids(gateway(&document, &config).await, IdGenerator::with_prefix("it"));
    session.load().await.expect("initial load");
    (session, document, config)
}
