use std::path::PathBuf;
use std::sync::Arc;

use earmark::application::{ChallengeStore, PlaybackService};
use earmark::config::Config;
use earmark::domain::playback::PlayerState;
use earmark::infrastructure::audio::{SimulatedAudioEngine, SimulatedEngineConfig};
use earmark::infrastructure::persistence::JsonFileChallengeRepository;
use earmark::infrastructure::reward::InMemoryRewardLedger;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("earmark.toml"));
    let config = Config::load(Some(config_path.as_path()))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Earmark");
    info!("Configuration loaded: {:?}", config);

    let repository = Arc::new(JsonFileChallengeRepository::new(&config.storage.catalog_path));
    let store = Arc::new(ChallengeStore::restore(repository).await);

    let engine = Arc::new(SimulatedAudioEngine::new(SimulatedEngineConfig {
        status_interval: config.engine.status_interval(),
        default_duration: config.engine.default_track_length(),
        playback_rate: config.engine.playback_rate,
    }));
    let ledger = Arc::new(InMemoryRewardLedger::new());
    let service = Arc::new(PlaybackService::new(engine, store.clone(), ledger.clone()));

    let mut session = service.subscribe_session();
    tokio::spawn(async move {
        while session.changed().await.is_ok() {
            let snapshot = session.borrow_and_update().clone();
            info!(
                state = snapshot.state.as_str(),
                title = snapshot.title().unwrap_or("-"),
                progress = format!("{:.1}%", snapshot.progress_percent().unwrap_or(0.0)),
                "Session updated"
            );
        }
    });

    tokio::select! {
        result = play_catalog(&service) => result?,
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Interrupted");
        }
    }

    info!("Shutting down...");
    service.teardown().await;

    let summary = store.summary().await;
    info!(
        completed = summary.completed,
        total = summary.total,
        points_earned = summary.points_earned,
        ledger_points = ledger.total_points().await,
        overall_progress = format!("{:.1}%", summary.overall_progress),
        "Catalog summary"
    );

    Ok(())
}

/// Play every incomplete challenge in catalog order until each one finishes
async fn play_catalog(service: &PlaybackService) -> anyhow::Result<()> {
    while let Some(challenge) = service.store().next_incomplete().await {
        info!(challenge_id = %challenge.id, title = %challenge.title, "Playing challenge");
        service.load_challenge(&challenge.id).await?;

        if service.session().state == PlayerState::Error {
            warn!(
                challenge_id = %challenge.id,
                error = service.session().last_error.as_deref().unwrap_or("unknown"),
                "Could not play challenge"
            );
            return Ok(());
        }

        loop {
            let Some(completions) = service.process_next().await else {
                return Ok(());
            };
            if completions.iter().any(|c| c.challenge_id == challenge.id) {
                break;
            }
            if service.session().state == PlayerState::Error {
                return Ok(());
            }
        }
    }

    info!("All challenges completed");
    Ok(())
}
