//! Playback service
//!
//! Application facade wiring the playback controller to the challenge store
//! and the reward ledger. User actions go straight to the controller; status
//! notifications are drained here, run through the controller's tracker and
//! the resulting effects dispatched.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::application::challenge_store::ChallengeStore;
use crate::application::dispatcher::EffectDispatcher;
use crate::domain::challenge::ChallengeCompleted;
use crate::domain::playback::{
    AudioEngine, PlaybackController, PlaybackSession, StatusNotification,
};
use crate::domain::reward::RewardLedger;
use crate::domain::shared::value_objects::ChallengeId;
use crate::domain::shared::{DomainError, Result};

pub struct PlaybackService {
    controller: PlaybackController,
    store: Arc<ChallengeStore>,
    dispatcher: EffectDispatcher,
    notifications: Mutex<mpsc::UnboundedReceiver<StatusNotification>>,
}

impl PlaybackService {
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        store: Arc<ChallengeStore>,
        ledger: Arc<dyn RewardLedger>,
    ) -> Self {
        let (controller, notifications) = PlaybackController::new(engine);
        Self {
            controller,
            dispatcher: EffectDispatcher::new(store.clone(), ledger),
            store,
            notifications: Mutex::new(notifications),
        }
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn store(&self) -> &Arc<ChallengeStore> {
        &self.store
    }

    pub fn session(&self) -> PlaybackSession {
        self.controller.session()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<PlaybackSession> {
        self.controller.subscribe()
    }

    /// Load the challenge with `id` from the catalog and start playing it
    pub async fn load_challenge(&self, id: &ChallengeId) -> Result<()> {
        let challenge = self
            .store
            .get(id)
            .await
            .ok_or_else(|| DomainError::NotFound(format!("challenge {}", id)))?;

        self.controller.load(challenge).await;
        Ok(())
    }

    pub async fn play(&self) {
        self.controller.play().await;
    }

    pub async fn resume(&self) {
        self.controller.resume().await;
    }

    pub async fn pause(&self) {
        self.controller.pause().await;
    }

    pub async fn stop(&self) {
        self.controller.stop().await;
    }

    pub async fn seek(&self, position_seconds: f64) {
        self.controller.seek(position_seconds).await;
    }

    pub async fn teardown(&self) {
        self.controller.teardown().await;
    }

    /// Apply one notification and dispatch its effects
    pub async fn handle_notification(
        &self,
        notification: StatusNotification,
    ) -> Vec<ChallengeCompleted> {
        let effects = self.controller.handle_status(notification);
        if effects.is_empty() {
            return Vec::new();
        }
        self.dispatcher.dispatch(effects).await
    }

    /// Handle every notification already queued, without waiting for more
    pub async fn process_pending(&self) -> Vec<ChallengeCompleted> {
        let mut completions = Vec::new();
        loop {
            let next = self.notifications.lock().await.try_recv();
            match next {
                Ok(notification) => {
                    completions.extend(self.handle_notification(notification).await);
                }
                Err(_) => break,
            }
        }
        completions
    }

    /// Wait for the next notification and handle it.
    ///
    /// Returns `None` once the notification channel has closed.
    pub async fn process_next(&self) -> Option<Vec<ChallengeCompleted>> {
        let next = self.notifications.lock().await.recv().await;
        match next {
            Some(notification) => Some(self.handle_notification(notification).await),
            None => None,
        }
    }

    /// Drive notifications in a background task until the channel closes
    pub fn spawn_event_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            debug!("Playback event loop started");
            while let Some(completions) = service.process_next().await {
                for completion in completions {
                    info!(
                        challenge_id = %completion.challenge_id,
                        points = completion.points,
                        "Challenge completion dispatched"
                    );
                }
            }
            debug!("Playback event loop stopped");
        })
    }
}
