mod common;

use common::{chapter, session};
use lms_admin::admin::{ChapterDraft, DeleteOutcome, ExerciseLocator, StepDraft};
use lms_admin::catalog;
use lms_admin::content::{Level, StepType, classify_level, subtree_size};
use lms_admin::error::ErrorKind;
use std::collections::HashSet;

#[test]
fn test_every_id_lands_in_exactly_one_level() {
    let ids = ["101", "1", "10", "2001", "20", "305", "3", "40", "", "ch9", "theme-douane", "١٠"];
    for id in ids {
        let level = classify_level(id);
        assert_eq!(Level::ALL.iter().filter(|l| **l == level).count(), 1, "{}", id);
    }
    assert_eq!(classify_level("101"), Level::N2);
    assert_eq!(classify_level("2001"), Level::N3);
    assert_eq!(classify_level("305"), Level::N4);
    assert_eq!(classify_level("ch9"), Level::N1);
}

#[tokio::test]
async fn test_level_buckets_partition_the_tree() {
    let (session, _, _) = session(vec![
        chapter("ch1", 0, 0),
        chapter("101", 0, 0),
        chapter("102", 0, 0),
        chapter("201", 0, 0),
        chapter("301", 0, 0),
    ])
    .await;

    let mut seen = HashSet::new();
    for level in Level::ALL {
        for chapter in session.store().chapters_in_level(level) {
            assert!(seen.insert(chapter.id.clone()), "{} listed twice", chapter.id);
        }
    }
    assert_eq!(seen.len(), session.store().len());
    assert_eq!(
        session.store().level_summary(),
        vec![(Level::N1, 1), (Level::N2, 2), (Level::N3, 1), (Level::N4, 1)]
    );
}

#[tokio::test]
async fn test_create_chapter_then_reject_duplicate() {
    let (mut session, document, _) = session(vec![chapter("101", 1, 1)]).await;

    let draft = ChapterDraft {
        id: "ch9".to_string(),
        titre: "Nouveau".to_string(),
        niveau: Some("N1".to_string()),
        description: None,
    };
    session.create_chapter(draft.clone()).await.unwrap();

    assert_eq!(session.store().len(), 2);
    assert!(
        session
            .store()
            .chapters_in_level(Level::N1)
            .iter()
            .any(|c| c.id == "ch9")
    );
    assert!(document.chapters().iter().any(|c| c.id == "ch9"));

    let err = session.create_chapter(draft).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateId);
    assert_eq!(session.store().len(), 2);
    assert_eq!(document.chapters().len(), 2);
}

#[tokio::test]
async fn test_each_create_adds_exactly_one_entity() {
    let (mut session, _, _) = session(vec![chapter("101", 1, 0)]).await;

    let outcome = session
        .create_step(
            "101",
            StepDraft {
                titre: "Entraînement".to_string(),
                step_type: StepType::Entrainement,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let chapter = session.store().find_chapter("101").unwrap();
    assert_eq!(chapter.etapes.len(), 2);
    assert_eq!(chapter.etapes[1].id, outcome.id);

    let exercise = catalog::instantiate_template(0).unwrap();
    session.create_exercise("101", 1, exercise).await.unwrap();
    assert_eq!(session.store().find_chapter("101").unwrap().exercise_count(), 1);
}

#[tokio::test]
async fn test_delete_removes_the_whole_subtree() {
    let (mut session, document, _) = session(vec![chapter("101", 3, 2), chapter("201", 1, 1)]).await;
    let expected = subtree_size(session.store().find_chapter("101").unwrap());
    assert_eq!(expected, 10);

    let cancelled = session.delete_chapter("101", &|_: &str| false).await.unwrap();
    assert_eq!(cancelled, DeleteOutcome::Cancelled);
    assert_eq!(session.store().len(), 2);

    let outcome = session.delete_chapter("101", &|_: &str| true).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted { removed: 10, reloaded: true });
    assert!(session.store().find_chapter("101").is_none());
    assert_eq!(document.chapters().len(), 1);
}

#[tokio::test]
async fn test_exercise_lifecycle_through_entity_endpoints() {
    let (mut session, document, _) = session(vec![chapter("101", 1, 1)]).await;

    let mut exercise = catalog::instantiate_template(0).unwrap();
    exercise.question = Some("Quel document accompagne la marchandise ?".to_string());
    let created = session.create_exercise("101", 0, exercise).await.unwrap();

    let locator = ExerciseLocator::new("101", 0, 1);
    assert_eq!(session.store().find_exercise("101", 0, 1).unwrap().id, created.id);

    let outcome = session.delete_exercise(&locator, &|_: &str| true).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted { removed: 1, reloaded: true });

    let requests = document.requests();
    assert!(requests.contains(&"POST steps/101-s0/exercises".to_string()));
    assert!(requests.contains(&format!("DELETE exercises/{}", created.id)));
}
