//! Simulated audio engine
//!
//! Timer-driven stand-in for a native engine. Each resource runs a ticker
//! task that advances the position while playing and emits a status
//! notification on every tick, finishing with a `just_finished` status.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::playback::{AudioEngine, AudioResource, EngineError, PlaybackStatus, StatusCallback};

/// Simulated engine settings
#[derive(Debug, Clone)]
pub struct SimulatedEngineConfig {
    /// How often a playing resource reports its status
    pub status_interval: Duration,
    /// Length of tracks without an explicit duration
    pub default_duration: Duration,
    /// Media time advanced per wall-clock time
    pub playback_rate: f64,
}

impl Default for SimulatedEngineConfig {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(250),
            default_duration: Duration::from_secs(30),
            playback_rate: 1.0,
        }
    }
}

pub struct SimulatedAudioEngine {
    config: SimulatedEngineConfig,
    durations: HashMap<String, Duration>,
    unavailable: HashSet<String>,
}

impl SimulatedAudioEngine {
    pub fn new(config: SimulatedEngineConfig) -> Self {
        Self {
            config,
            durations: HashMap::new(),
            unavailable: HashSet::new(),
        }
    }

    /// Give `uri` a specific track length
    pub fn with_track(mut self, uri: impl Into<String>, duration: Duration) -> Self {
        self.durations.insert(uri.into(), duration);
        self
    }

    /// Make acquisitions of `uri` fail
    pub fn with_unavailable(mut self, uri: impl Into<String>) -> Self {
        self.unavailable.insert(uri.into());
        self
    }
}

impl Default for SimulatedAudioEngine {
    fn default() -> Self {
        Self::new(SimulatedEngineConfig::default())
    }
}

#[async_trait]
impl AudioEngine for SimulatedAudioEngine {
    async fn acquire(&self, uri: &str, autoplay: bool) -> Result<Arc<dyn AudioResource>, EngineError> {
        if self.unavailable.contains(uri) {
            return Err(EngineError::load(uri, "asset not available"));
        }

        let duration = self
            .durations
            .get(uri)
            .copied()
            .unwrap_or(self.config.default_duration);

        debug!(uri, duration_ms = duration.as_millis() as u64, autoplay, "Simulated resource acquired");
        let resource = SimulatedResource::start(uri, duration, autoplay, &self.config);
        Ok(Arc::new(resource))
    }
}

#[derive(Default)]
struct SimState {
    position_ms: u64,
    duration_ms: u64,
    playing: bool,
    released: bool,
    callback: Option<StatusCallback>,
}

impl SimState {
    fn status(&self) -> PlaybackStatus {
        PlaybackStatus::loaded(self.position_ms, Some(self.duration_ms), self.playing)
    }
}

/// One simulated playable instance
pub struct SimulatedResource {
    uri: String,
    state: Arc<Mutex<SimState>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedResource {
    fn start(uri: &str, duration: Duration, autoplay: bool, config: &SimulatedEngineConfig) -> Self {
        let state = Arc::new(Mutex::new(SimState {
            duration_ms: duration.as_millis() as u64,
            playing: autoplay,
            ..SimState::default()
        }));

        let interval = config.status_interval.max(Duration::from_millis(1));
        let step_ms = ((interval.as_millis() as f64) * config.playback_rate.max(0.0)).round() as u64;
        let ticker = tokio::spawn(run_ticker(state.clone(), interval, step_ms));

        Self {
            uri: uri.to_string(),
            state,
            ticker: Mutex::new(Some(ticker)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        lock_state(&self.state)
    }

    /// Mutate the state and notify the subscriber with the resulting status
    fn update(&self, apply: impl FnOnce(&mut SimState)) -> Result<(), EngineError> {
        let (callback, status) = {
            let mut state = self.lock();
            if state.released {
                return Err(EngineError::Released);
            }
            apply(&mut state);
            (state.callback.clone(), state.status())
        };

        if let Some(callback) = callback {
            callback(status);
        }
        Ok(())
    }
}

#[async_trait]
impl AudioResource for SimulatedResource {
    async fn play(&self) -> Result<(), EngineError> {
        self.update(|state| {
            if state.position_ms >= state.duration_ms {
                state.position_ms = 0;
            }
            state.playing = true;
        })
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.update(|state| state.playing = false)
    }

    async fn seek(&self, position_ms: u64) -> Result<(), EngineError> {
        self.update(|state| state.position_ms = position_ms.min(state.duration_ms))
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.update(|state| {
            state.playing = false;
            state.position_ms = 0;
        })
    }

    async fn release(&self) -> Result<(), EngineError> {
        {
            let mut state = self.lock();
            if state.released {
                return Err(EngineError::Released);
            }
            state.released = true;
            state.playing = false;
            state.callback = None;
        }

        let ticker = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(ticker) = ticker {
            ticker.abort();
        }

        debug!(uri = %self.uri, "Simulated resource released");
        Ok(())
    }

    fn subscribe(&self, callback: StatusCallback) {
        let status = {
            let mut state = self.lock();
            if state.released {
                return;
            }
            state.callback = Some(callback.clone());
            state.status()
        };
        callback(status);
    }
}

async fn run_ticker(state: Arc<Mutex<SimState>>, interval: Duration, step_ms: u64) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let emit = {
            let mut state = lock_state(&state);
            if state.released {
                break;
            }
            if !state.playing {
                continue;
            }

            state.position_ms = state.position_ms.saturating_add(step_ms).min(state.duration_ms);
            let finished = state.position_ms >= state.duration_ms;
            if finished {
                state.playing = false;
            }

            let mut status = state.status();
            if finished {
                status = status.finished();
            }
            state.callback.clone().map(|callback| (callback, status))
        };

        if let Some((callback, status)) = emit {
            trace!(position_ms = status.position_ms, "Simulated status tick");
            callback(status);
        }
    }
}

fn lock_state(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
