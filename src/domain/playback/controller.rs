//! Playback controller
//!
//! Owns the single live audio resource and serializes lifecycle transitions
//! (load → play → pause/resume → stop/seek → teardown).
//!
//! Every acquisition attempt gets a fresh [`Generation`]. The generation is
//! stamped on the status callback registered with the resource and checked
//! again whenever an asynchronous result comes back, so:
//! - status notifications from a released resource are dropped,
//! - an acquisition that resolves after a newer `load` (or a `teardown`) is
//!   released immediately instead of being adopted.
//!
//! Internal state sits behind a short-lived mutex that is never held across
//! an engine call.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::domain::challenge::Challenge;
use crate::domain::playback::engine::{
    AudioEngine, AudioResource, EngineError, PlaybackStatus, StatusCallback,
};
use crate::domain::playback::session::{PlaybackSession, PlayerState};
use crate::domain::playback::tracker::{ProgressTracker, SideEffect};
use crate::domain::shared::value_objects::Generation;

/// A status notification tagged with the generation of the resource that emitted it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusNotification {
    pub generation: Generation,
    pub status: PlaybackStatus,
}

/// Status subscription for one resource lifetime
#[derive(Debug, Clone)]
struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }
}

struct ActiveResource {
    generation: Generation,
    resource: Arc<dyn AudioResource>,
    subscription: Subscription,
}

struct ControllerInner {
    generation: Generation,
    resource: Option<ActiveResource>,
    session: PlaybackSession,
}

impl ControllerInner {
    fn is_current(&self, generation: Generation) -> bool {
        self.resource
            .as_ref()
            .map(|active| active.generation == generation)
            .unwrap_or(false)
    }
}

/// Playback controller
///
/// Cheap to clone; clones share the same resource and session.
#[derive(Clone)]
pub struct PlaybackController {
    engine: Arc<dyn AudioEngine>,
    tracker: ProgressTracker,
    inner: Arc<Mutex<ControllerInner>>,
    notifications: mpsc::UnboundedSender<StatusNotification>,
    observers: Arc<watch::Sender<PlaybackSession>>,
}

impl PlaybackController {
    /// Create a controller and the receiving end of its status notifications
    pub fn new(
        engine: Arc<dyn AudioEngine>,
    ) -> (Self, mpsc::UnboundedReceiver<StatusNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (observers, _) = watch::channel(PlaybackSession::idle());

        let controller = Self {
            engine,
            tracker: ProgressTracker::new(),
            inner: Arc::new(Mutex::new(ControllerInner {
                generation: Generation::default(),
                resource: None,
                session: PlaybackSession::idle(),
            })),
            notifications: tx,
            observers: Arc::new(observers),
        };

        (controller, rx)
    }

    /// Snapshot of the current session
    pub fn session(&self) -> PlaybackSession {
        self.lock().session.clone()
    }

    /// Current controller state
    pub fn state(&self) -> PlayerState {
        self.lock().session.state
    }

    /// Whether a resource is currently held
    pub fn has_resource(&self) -> bool {
        self.lock().resource.is_some()
    }

    /// Generation of the most recent acquisition attempt
    pub fn generation(&self) -> Generation {
        self.lock().generation
    }

    /// Watch session snapshots; a new value is published after every transition
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.observers.subscribe()
    }

    /// Load `track`, replacing whatever is loaded, and start playing it
    pub async fn load(&self, track: Challenge) {
        let (generation, previous) = {
            let mut inner = self.lock();
            let previous = inner.resource.take();
            inner.generation = inner.generation.next();
            inner.session = PlaybackSession::loading(track.clone());
            self.publish(&inner);
            (inner.generation, previous)
        };

        info!(
            challenge_id = %track.id,
            %generation,
            uri = %track.audio_uri,
            "Loading challenge audio"
        );

        if let Some(previous) = previous {
            self.release(previous).await;
        }

        if self.generation() != generation {
            debug!(challenge_id = %track.id, %generation, "Load superseded before acquisition");
            return;
        }

        match self.engine.acquire(&track.audio_uri, true).await {
            Ok(resource) => {
                let subscription = Subscription::new();
                let adopted = {
                    let mut inner = self.lock();
                    if inner.generation == generation {
                        inner.resource = Some(ActiveResource {
                            generation,
                            resource: resource.clone(),
                            subscription: subscription.clone(),
                        });
                        inner.session.state = PlayerState::Playing;
                        inner.session.loading = false;
                        inner.session.is_playing = true;
                        self.publish(&inner);
                        true
                    } else {
                        false
                    }
                };

                if adopted {
                    resource.subscribe(self.status_callback(generation, subscription));
                    debug!(challenge_id = %track.id, %generation, "Audio resource ready");
                } else {
                    warn!(
                        challenge_id = %track.id,
                        %generation,
                        "Acquisition superseded before it resolved; releasing late resource"
                    );
                    self.release(ActiveResource {
                        generation,
                        resource,
                        subscription,
                    })
                    .await;
                }
            }
            Err(err) => {
                let mut inner = self.lock();
                if inner.generation != generation {
                    debug!(%generation, error = %err, "Ignoring failure of superseded acquisition");
                    return;
                }
                metrics::counter!("earmark_engine_errors_total").increment(1);
                error!(challenge_id = %track.id, %generation, error = %err, "Failed to load audio");
                inner.session.state = PlayerState::Error;
                inner.session.loading = false;
                inner.session.is_playing = false;
                inner.session.last_error = Some(err.to_string());
                self.publish(&inner);
            }
        }
    }

    /// Start playback of the loaded resource
    pub async fn play(&self) {
        self.control("play", |r| async move { r.play().await }, |session| {
            session.state = PlayerState::Playing;
            session.is_playing = true;
        })
        .await;
    }

    /// Continue playback after a pause
    pub async fn resume(&self) {
        self.control("resume", |r| async move { r.play().await }, |session| {
            session.state = PlayerState::Playing;
            session.is_playing = true;
        })
        .await;
    }

    /// Pause playback, keeping the resource and its position
    pub async fn pause(&self) {
        self.control("pause", |r| async move { r.pause().await }, |session| {
            session.state = PlayerState::Paused;
            session.is_playing = false;
        })
        .await;
    }

    /// Halt playback without releasing the resource
    pub async fn stop(&self) {
        self.control("stop", |r| async move { r.stop().await }, |session| {
            session.state = PlayerState::Paused;
            session.is_playing = false;
        })
        .await;
    }

    /// Jump to `position_seconds`; negative positions seek to the start
    pub async fn seek(&self, position_seconds: f64) {
        let position_ms = (position_seconds.max(0.0) * 1000.0) as u64;
        self.control("seek", move |r| async move { r.seek(position_ms).await }, |_| {})
            .await;
    }

    /// Stop and release any held resource and return to `Idle`.
    ///
    /// Safe to call repeatedly. Release failures are logged only.
    pub async fn teardown(&self) {
        let previous = {
            let mut inner = self.lock();
            let previous = inner.resource.take();
            inner.generation = inner.generation.next();
            inner.session = PlaybackSession::idle();
            self.publish(&inner);
            previous
        };

        match previous {
            Some(previous) => {
                info!(generation = %previous.generation, "Tearing down playback");
                self.release(previous).await;
            }
            None => debug!("Teardown with no resource held"),
        }
    }

    /// Apply a status notification.
    ///
    /// Notifications from anything but the currently held resource are
    /// discarded. Returns the side effects the caller must dispatch.
    pub fn handle_status(&self, notification: StatusNotification) -> Vec<SideEffect> {
        let mut inner = self.lock();
        if !inner.is_current(notification.generation) {
            metrics::counter!("earmark_stale_status_dropped_total").increment(1);
            debug!(
                generation = %notification.generation,
                current = %inner.generation,
                "Dropping stale status notification"
            );
            return Vec::new();
        }

        let outcome = self.tracker.apply(&inner.session, &notification.status);
        inner.session = outcome.session;
        if matches!(inner.session.state, PlayerState::Playing | PlayerState::Paused) {
            inner.session.state = if inner.session.is_playing {
                PlayerState::Playing
            } else {
                PlayerState::Paused
            };
        }
        self.publish(&inner);

        outcome.effects
    }

    async fn control<F, Fut>(
        &self,
        operation: &'static str,
        call: F,
        on_success: impl FnOnce(&mut PlaybackSession),
    ) where
        F: FnOnce(Arc<dyn AudioResource>) -> Fut,
        Fut: Future<Output = Result<(), EngineError>>,
    {
        let (generation, resource) = {
            let inner = self.lock();
            match inner.resource.as_ref() {
                Some(active) => (active.generation, active.resource.clone()),
                None => {
                    warn!(operation, "No audio loaded; ignoring request");
                    return;
                }
            }
        };

        match call(resource).await {
            Ok(()) => {
                let mut inner = self.lock();
                if inner.is_current(generation) {
                    on_success(&mut inner.session);
                    self.publish(&inner);
                } else {
                    debug!(operation, %generation, "Resource replaced while request was in flight");
                }
            }
            Err(err) => self.fail(generation, operation, err).await,
        }
    }

    /// Record an engine failure and drop the resource it happened on
    async fn fail(&self, generation: Generation, operation: &'static str, err: EngineError) {
        let taken = {
            let mut inner = self.lock();
            if !inner.is_current(generation) {
                debug!(operation, %generation, error = %err, "Ignoring failure on superseded resource");
                return;
            }
            metrics::counter!("earmark_engine_errors_total").increment(1);
            error!(operation, %generation, error = %err, "Audio engine request failed");

            let taken = inner.resource.take();
            inner.generation = inner.generation.next();
            inner.session.state = PlayerState::Error;
            inner.session.loading = false;
            inner.session.is_playing = false;
            inner.session.last_error = Some(err.to_string());
            self.publish(&inner);
            taken
        };

        if let Some(active) = taken {
            self.release(active).await;
        }
    }

    /// Cancel the subscription, then stop and release. Never fails.
    async fn release(&self, active: ActiveResource) {
        active.subscription.cancel();

        if let Err(err) = active.resource.stop().await {
            warn!(generation = %active.generation, error = %err, "Failed to stop audio resource");
        }
        if let Err(err) = active.resource.release().await {
            warn!(generation = %active.generation, error = %err, "Failed to release audio resource");
        } else {
            debug!(generation = %active.generation, "Audio resource released");
        }
    }

    fn status_callback(&self, generation: Generation, subscription: Subscription) -> StatusCallback {
        let tx = self.notifications.clone();
        Arc::new(move |status: PlaybackStatus| {
            if !subscription.is_active() {
                return;
            }
            if tx.send(StatusNotification { generation, status }).is_err() {
                debug!(%generation, "Status receiver closed");
            }
        })
    }

    fn publish(&self, inner: &ControllerInner) {
        self.observers.send_replace(inner.session.clone());
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
