#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use buildwatch_core::{
    AggregateState, BuildPlan, FetchError, MonitorConfig, OutputPorts, PlanSource,
    PresentationSink, Snapshot, SpeechSink, VisualNotification, VisualSink,
};
use tokio::sync::Semaphore;

pub type Script = Vec<Result<Vec<BuildPlan>, FetchError>>;

/// Plays back a fixed list of fetch results, repeating the last one.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<BuildPlan>, FetchError>>>,
    last: Mutex<Option<Result<Vec<BuildPlan>, FetchError>>>,
    pub calls: AtomicUsize,
    /// When set, every fetch waits for a permit
    pub gate: Option<Semaphore>,
}

impl ScriptedSource {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self::build(script, None))
    }

    pub fn gated(script: Script) -> Arc<Self> {
        Arc::new(Self::build(script, Some(Semaphore::new(0))))
    }

    fn build(script: Script, gate: Option<Semaphore>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            gate,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }
}

#[async_trait]
impl PlanSource for ScriptedSource {
    async fn fetch_plans(&self) -> Result<Vec<BuildPlan>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?
                .forget();
        }

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(result) => {
                *last = Some(result.clone());
                result
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(FetchError::Network("empty script".to_string()))),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Everything the monitor published, in order.
#[derive(Default)]
pub struct Published {
    pub snapshots: Vec<Snapshot>,
    pub states: Vec<AggregateState>,
    pub connection_errors: Vec<FetchError>,
    pub visual: Vec<VisualNotification>,
    pub spoken: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Published>>);

impl Recorder {
    pub fn ports(&self) -> OutputPorts {
        OutputPorts {
            presentation: Box::new(self.clone()),
            visual: Box::new(self.clone()),
            speech: Box::new(self.clone()),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&Published) -> R) -> R {
        f(&self.0.lock().unwrap())
    }

    pub fn visual_captions(&self) -> Vec<String> {
        self.with(|p| p.visual.iter().map(|n| n.caption.clone()).collect())
    }

    pub fn last_state(&self) -> Option<AggregateState> {
        self.with(|p| p.states.last().copied())
    }
}

impl PresentationSink for Recorder {
    fn snapshot_updated(&mut self, snapshot: &Snapshot) {
        self.0.lock().unwrap().snapshots.push(snapshot.clone());
    }

    fn aggregate_state_changed(&mut self, state: &AggregateState) {
        self.0.lock().unwrap().states.push(*state);
    }

    fn connection_error(&mut self, error: &FetchError) {
        self.0.lock().unwrap().connection_errors.push(error.clone());
    }
}

impl VisualSink for Recorder {
    fn show(&mut self, notification: &VisualNotification) {
        self.0.lock().unwrap().visual.push(notification.clone());
    }
}

impl SpeechSink for Recorder {
    fn speak(&mut self, utterance: &str, voice_id: &str) {
        self.0
            .lock()
            .unwrap()
            .spoken
            .push((utterance.to_string(), voice_id.to_string()));
    }
}

pub fn plan(key: &str, active: bool, broken: bool) -> BuildPlan {
    BuildPlan::new(key, key).active(active).broken(broken)
}

/// Default configuration with speech on and a short poll interval.
pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval_ms: 1_000,
        fetch_timeout_ms: 500,
        animation_interval_ms: 100,
        spoken_notifications_enabled: true,
        spoken_notification_kinds: buildwatch_core::NotificationKind::ALL.into_iter().collect(),
        voice_id: "alex".to_string(),
        ..Default::default()
    }
}
