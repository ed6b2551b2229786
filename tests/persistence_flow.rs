mod common;

use common::{chapter, gateway, session};
use lms_admin::admin::{AdminSession, ChapterChanges, ChapterDraft};
use lms_admin::api::InMemoryDocument;
use lms_admin::config::Config;
use lms_admin::error::ErrorKind;
use lms_admin::persistence::{APP_CACHE_KEY, LEGACY_CACHE_KEY, merge_with_local_cache};
use lms_admin::store::TreeSource;
use std::collections::HashSet;

fn ids(chapters: &[lms_admin::content::Chapter]) -> Vec<String> {
    chapters.iter().map(|c| c.id.clone()).collect()
}

#[test]
fn test_merge_is_idempotent_and_remote_wins() {
    let remote = vec![chapter("101", 1, 0), chapter("201", 0, 0)];
    let mut stale = chapter("101", 3, 3);
    stale.titre = "Offline edit".to_string();
    let cached = vec![stale, chapter("ch9", 0, 0)];

    let once = merge_with_local_cache(remote.clone(), cached);
    let twice = merge_with_local_cache(remote, once.clone());

    assert_eq!(once, twice);
    assert_eq!(ids(&once), vec!["101", "201", "ch9"]);
    assert_eq!(once[0].titre, "Chapitre 101");
}

#[tokio::test]
async fn test_saves_mirror_both_cache_keys() {
    let (mut session, _, config) = session(vec![chapter("101", 1, 1)]).await;
    session.duplicate_chapter("101").await.unwrap();

    let cache = config.local_cache();
    for key in [APP_CACHE_KEY, LEGACY_CACHE_KEY] {
        let cached = cache.read_chapters(key).await.unwrap().unwrap();
        assert_eq!(cached.len(), 2, "{}", key);
    }
}

#[tokio::test]
async fn test_cache_only_chapters_survive_a_reload() {
    let (mut session, document, config) = session(vec![chapter("101", 0, 0)]).await;
    config
        .local_cache()
        .write_chapters(APP_CACHE_KEY, &[chapter("ch9", 1, 1)])
        .await
        .unwrap();

    session.reload().await.unwrap();
    assert_eq!(ids(session.store().chapters()), vec!["101", "ch9"]);
    assert_eq!(document.chapters().len(), 1);
}

#[tokio::test]
async fn test_import_of_an_export_is_a_superset() {
    let (mut session, _, _) = session(vec![chapter("101", 2, 1), chapter("ch9", 1, 0)]).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chapitres.json");

    let before: HashSet<String> = ids(session.store().chapters()).into_iter().collect();
    session.export_to_file(&path).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.trim_start().starts_with('['));

    let report = session.import_from_file(&path).await.unwrap();
    assert!(report.imported.is_empty());
    let after: HashSet<String> = ids(session.store().chapters()).into_iter().collect();
    assert!(after.is_superset(&before));
}

#[tokio::test]
async fn test_network_failure_leaves_the_store_untouched() {
    let (mut session, document, config) = session(vec![chapter("101", 1, 1)]).await;
    document.set_offline(true);

    let err = session
        .create_chapter(ChapterDraft {
            id: "ch9".to_string(),
            titre: "Hors ligne".to_string(),
            niveau: Some("N1".to_string()),
            description: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(!err.is_timeout());
    assert_eq!(ids(session.store().chapters()), vec!["101"]);
    assert!(config.local_cache().read_chapters(APP_CACHE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_timeouts_are_distinguishable() {
    let (mut session, document, _) = session(vec![chapter("101", 1, 1)]).await;
    document.set_timing_out(true);

    let err = session
        .edit_chapter(
            "101",
            ChapterChanges {
                titre: Some("Renommé".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(session.store().find_chapter("101").unwrap().titre, "Chapitre 101");

    let err = session.reload().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_rejected_save_is_reported_with_the_server_reason() {
    let (mut session, document, _) = session(vec![chapter("101", 1, 1)]).await;
    document.refuse_saves(Some("quota dépassé"));

    let err = session.duplicate_chapter("101").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SaveRejected);
    assert!(err.status_message().contains("quota dépassé"));
    assert_eq!(session.store().len(), 1);
}

#[tokio::test]
async fn test_offline_fallback_uses_the_mirror() {
    let document = InMemoryDocument::new(vec![chapter("101", 1, 1), chapter("201", 0, 0)]);
    let config = Config::new_test().await.unwrap();

    // A first session saves, which mirrors the tree locally
    let mut first = AdminSession::new(gateway(&document, &config).await);
    first.load().await.unwrap();
    first.duplicate_chapter("201").await.unwrap();

    document.set_offline(true);
    let mut second = AdminSession::new(gateway(&document, &config).await);
    assert!(second.load_with_fallback(false).await.is_err());
    assert_eq!(second.load_with_fallback(true).await.unwrap(), TreeSource::LocalCache);
    assert_eq!(second.store().len(), 3);
    assert_eq!(second.store().source(), TreeSource::LocalCache);
}
