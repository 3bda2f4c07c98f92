//! Catalog persistence integration tests

mod common;

use std::sync::Arc;

use common::{challenge, ScriptedEngine};
use earmark::application::{ChallengeStore, PlaybackService};
use earmark::domain::challenge::default_catalog;
use earmark::domain::playback::PlaybackStatus;
use earmark::domain::shared::value_objects::ChallengeId;
use earmark::infrastructure::persistence::JsonFileChallengeRepository;
use earmark::infrastructure::reward::InMemoryRewardLedger;
use uuid::Uuid;

fn catalog_path() -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("earmark-it-{}", Uuid::new_v4()))
        .join("challenges.json")
}

#[tokio::test]
async fn test_completion_survives_restart() {
    let path = catalog_path();
    let id = ChallengeId::from("t1");

    {
        let repository = Arc::new(JsonFileChallengeRepository::new(&path));
        let store = Arc::new(ChallengeStore::new(
            repository,
            vec![challenge("t1", 10), challenge("t2", 20)],
        ));
        let engine = ScriptedEngine::new();
        let service = PlaybackService::new(
            engine.clone(),
            store.clone(),
            Arc::new(InMemoryRewardLedger::new()),
        );

        service.load_challenge(&id).await.unwrap();
        engine
            .resource(0)
            .emit(PlaybackStatus::loaded(30_000, Some(30_000), false).finished());
        assert_eq!(service.process_pending().await.len(), 1);
        service.teardown().await;
    }

    let restored = ChallengeStore::restore(Arc::new(JsonFileChallengeRepository::new(&path))).await;
    let t1 = restored.get(&id).await.unwrap();
    assert!(t1.completed);
    assert_eq!(t1.progress, 100.0);
    assert!(!restored.get(&"t2".into()).await.unwrap().completed);
    assert_eq!(restored.next_incomplete().await.unwrap().id, ChallengeId::from("t2"));

    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).ok();
    }
}

#[tokio::test]
async fn test_first_run_uses_default_catalog() {
    let path = catalog_path();

    let store = ChallengeStore::restore(Arc::new(JsonFileChallengeRepository::new(&path))).await;

    assert_eq!(store.list().await, default_catalog());
    assert!(!path.exists());
}
