//! Scripted audio engine shared by the integration tests
//!
//! Acquisitions can be held open until the test releases them, and status
//! notifications are emitted by hand.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use earmark::application::{ChallengeStore, PlaybackService};
use earmark::domain::challenge::Challenge;
use earmark::domain::playback::{AudioEngine, AudioResource, EngineError, PlaybackStatus, StatusCallback};
use earmark::infrastructure::persistence::InMemoryChallengeRepository;
use earmark::infrastructure::reward::InMemoryRewardLedger;
use tokio::sync::oneshot;

#[derive(Default)]
struct EngineState {
    resources: Vec<Arc<ScriptedResource>>,
    gates: VecDeque<oneshot::Receiver<()>>,
    failing: HashSet<String>,
}

#[derive(Default)]
pub struct ScriptedEngine {
    state: Mutex<EngineState>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold the next acquisition open until the returned sender fires
    pub fn gate_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().gates.push_back(rx);
        tx
    }

    pub fn fail_uri(&self, uri: &str) {
        self.state.lock().unwrap().failing.insert(uri.to_string());
    }

    pub fn acquisitions(&self) -> usize {
        self.state.lock().unwrap().resources.len()
    }

    /// Resource created by the `index`-th acquisition
    pub fn resource(&self, index: usize) -> Arc<ScriptedResource> {
        self.state.lock().unwrap().resources[index].clone()
    }
}

#[async_trait]
impl AudioEngine for ScriptedEngine {
    async fn acquire(&self, uri: &str, autoplay: bool) -> Result<Arc<dyn AudioResource>, EngineError> {
        let (resource, gate) = {
            let mut state = self.state.lock().unwrap();
            if state.failing.contains(uri) {
                return Err(EngineError::load(uri, "decoder rejected asset"));
            }
            let resource = Arc::new(ScriptedResource::new(uri, autoplay));
            state.resources.push(resource.clone());
            (resource, state.gates.pop_front())
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(resource)
    }
}

pub struct ScriptedResource {
    pub uri: String,
    pub autoplay: bool,
    callback: Mutex<Option<StatusCallback>>,
    calls: Mutex<Vec<String>>,
    stop_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl ScriptedResource {
    fn new(uri: &str, autoplay: bool) -> Self {
        Self {
            uri: uri.to_string(),
            autoplay,
            callback: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            stop_gate: Mutex::new(None),
        }
    }

    /// Hold the next `stop` open until the returned sender fires
    pub fn gate_stop(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.stop_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Deliver `status` to whoever subscribed, released or not
    pub fn emit(&self, status: PlaybackStatus) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback(status);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_released(&self) -> bool {
        self.calls().iter().any(|c| c == "release")
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl AudioResource for ScriptedResource {
    async fn play(&self) -> Result<(), EngineError> {
        self.record("play");
        Ok(())
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.record("pause");
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> Result<(), EngineError> {
        self.record(format!("seek:{}", position_ms));
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.record("stop");
        let gate = self.stop_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(())
    }

    async fn release(&self) -> Result<(), EngineError> {
        self.record("release");
        Ok(())
    }

    fn subscribe(&self, callback: StatusCallback) {
        *self.callback.lock().unwrap() = Some(callback);
    }
}

pub fn challenge(id: &str, points: u32) -> Challenge {
    Challenge::new(id, format!("Track {}", id), "Tester", format!("asset://{}.mp3", id), points)
}

pub struct Harness {
    pub engine: Arc<ScriptedEngine>,
    pub store: Arc<ChallengeStore>,
    pub ledger: Arc<InMemoryRewardLedger>,
    pub service: Arc<PlaybackService>,
}

pub fn harness(catalog: Vec<Challenge>) -> Harness {
    let engine = ScriptedEngine::new();
    let store = Arc::new(ChallengeStore::new(
        Arc::new(InMemoryChallengeRepository::new()),
        catalog,
    ));
    let ledger = Arc::new(InMemoryRewardLedger::new());
    let service = Arc::new(PlaybackService::new(engine.clone(), store.clone(), ledger.clone()));

    Harness {
        engine,
        store,
        ledger,
        service,
    }
}
