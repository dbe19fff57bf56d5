//! Single-flight fetch cycle.
//!
//! The [`Poller`] issues at most one fetch at a time against its
//! [`PlanSource`]. The fetch runs on its own tokio task with a bounded
//! timeout; its result is handed back to whoever drives the poller and
//! applied through [`Poller::complete`], which keeps every state transition
//! on one logical timeline.
//!
//! The poller owns the previous snapshot. A successful fetch is reported to
//! the [`PollObserver`] together with that baseline and then becomes the new
//! baseline. A failed fetch leaves the baseline untouched, so the next
//! success is still compared with the last known-good state.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;

use crate::config::PollSettings;
use crate::error::{FetchError, MonitorError, Result};
use crate::models::{BuildPlan, Snapshot};
use crate::source::PlanSource;

/// Outcome of one fetch.
pub type FetchResult = std::result::Result<Vec<BuildPlan>, FetchError>;

/// Receives the outcome of every applied fetch.
pub trait PollObserver {
    /// A new snapshot arrived. `previous` is the baseline it replaces.
    fn on_snapshot(&mut self, previous: &Snapshot, current: &Snapshot);

    /// The fetch failed; the baseline is kept.
    fn on_error(&mut self, error: &FetchError);
}

pub struct Poller {
    source: Arc<dyn PlanSource>,
    settings: PollSettings,
    previous: Snapshot,
    in_flight: Option<JoinHandle<FetchResult>>,
    stopped: bool,
}

impl Poller {
    /// # Errors
    ///
    /// Returns `MonitorError::Configuration` for a zero poll interval.
    pub fn new(source: Arc<dyn PlanSource>, settings: PollSettings) -> Result<Self> {
        if settings.interval.is_zero() {
            return Err(MonitorError::config("pollIntervalMs").with_reason("must be positive"));
        }

        Ok(Self {
            source,
            settings,
            previous: Snapshot::empty(),
            in_flight: None,
            stopped: false,
        })
    }

    pub fn interval(&self) -> Duration {
        self.settings.interval
    }

    /// Replaces the schedule. A zero interval is ignored.
    pub fn update_settings(&mut self, settings: PollSettings) {
        if settings.interval.is_zero() {
            return;
        }
        self.settings = settings;
    }

    /// Baseline for the next comparison.
    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Handles a scheduled tick. Issues a fetch unless one is already
    /// outstanding or the poller was stopped; returns whether it did.
    pub fn tick(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        if self.in_flight.is_some() {
            debug!("Fetch still outstanding, skipping tick");
            return false;
        }

        debug!("Fetching plans from {}", self.source.describe());
        let source = Arc::clone(&self.source);
        let timeout = self.settings.fetch_timeout;
        self.in_flight = Some(tokio::spawn(async move {
            match tokio::time::timeout(timeout, source.fetch_plans()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout)),
            }
        }));
        true
    }

    /// Waits for the outstanding fetch.
    ///
    /// Never resolves when nothing is in flight, which makes it safe to use
    /// as a `select!` branch. Cancel safe: dropping the future keeps the
    /// fetch outstanding.
    pub async fn wait(&mut self) -> FetchResult {
        let Some(handle) = self.in_flight.as_mut() else {
            return std::future::pending().await;
        };

        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(FetchError::Network(format!("fetch task failed: {e}"))),
        };
        self.in_flight = None;
        result
    }

    /// Applies a completed fetch. Results that arrive after [`Poller::stop`]
    /// are discarded.
    pub fn complete(&mut self, result: FetchResult, observer: &mut dyn PollObserver) {
        if self.stopped {
            debug!("Poller stopped, discarding fetch result");
            return;
        }

        match result.and_then(Snapshot::new) {
            Ok(snapshot) => {
                observer.on_snapshot(&self.previous, &snapshot);
                self.previous = snapshot;
            }
            Err(error) => observer.on_error(&error),
        }
    }

    /// Halts future ticks. An outstanding fetch may still finish but its
    /// result will not be applied.
    pub fn stop(&mut self) {
        if !self.stopped {
            info!("Poller stopped");
        }
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use super::*;

    /// Source whose fetches block until the test releases a permit.
    struct GatedSource {
        calls: AtomicUsize,
        gate: Semaphore,
        plans: Vec<BuildPlan>,
    }

    impl GatedSource {
        fn new(plans: Vec<BuildPlan>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Semaphore::new(0),
                plans,
            })
        }
    }

    #[async_trait]
    impl PlanSource for GatedSource {
        async fn fetch_plans(&self) -> std::result::Result<Vec<BuildPlan>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            permit.forget();
            Ok(self.plans.clone())
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }

    #[derive(Default)]
    struct Recorded {
        snapshots: Vec<(usize, usize)>,
        errors: Vec<FetchError>,
    }

    impl PollObserver for Recorded {
        fn on_snapshot(&mut self, previous: &Snapshot, current: &Snapshot) {
            self.snapshots.push((previous.len(), current.len()));
        }

        fn on_error(&mut self, error: &FetchError) {
            self.errors.push(error.clone());
        }
    }

    fn settings(interval_ms: u64, timeout_ms: u64) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(interval_ms),
            fetch_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let source = GatedSource::new(vec![]);
        let err = Poller::new(source, settings(0, 100)).err().unwrap();
        assert!(matches!(err, MonitorError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_single_flight() {
        let source = GatedSource::new(vec![BuildPlan::new("a", "A")]);
        let mut poller = Poller::new(source.clone(), settings(1000, 60_000)).unwrap();

        assert!(poller.tick());
        assert!(!poller.tick());
        assert!(!poller.tick());
        tokio::task::yield_now().await;

        source.gate.add_permits(1);
        let result = poller.wait().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let mut observer = Recorded::default();
        poller.complete(result, &mut observer);
        assert_eq!(observer.snapshots, vec![(0, 1)]);
        assert!(!poller.is_in_flight());
        assert!(poller.tick());
    }

    #[tokio::test]
    async fn test_failure_keeps_baseline() {
        let source = GatedSource::new(vec![BuildPlan::new("a", "A")]);
        let mut poller = Poller::new(source, settings(1000, 60_000)).unwrap();
        let mut observer = Recorded::default();

        poller.complete(Ok(vec![BuildPlan::new("a", "A")]), &mut observer);
        poller.complete(Err(FetchError::Network("down".to_string())), &mut observer);
        poller.complete(
            Ok(vec![BuildPlan::new("a", "A"), BuildPlan::new("b", "B")]),
            &mut observer,
        );

        assert_eq!(observer.snapshots, vec![(0, 1), (1, 2)]);
        assert_eq!(observer.errors.len(), 1);
        assert_eq!(poller.previous().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_keys_reported_as_error() {
        let source = GatedSource::new(vec![]);
        let mut poller = Poller::new(source, settings(1000, 60_000)).unwrap();
        let mut observer = Recorded::default();

        poller.complete(
            Ok(vec![BuildPlan::new("a", "A"), BuildPlan::new("a", "A again")]),
            &mut observer,
        );
        assert!(observer.snapshots.is_empty());
        assert!(matches!(observer.errors[0], FetchError::MalformedResponse(_)));
        assert!(poller.previous().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let source = GatedSource::new(vec![]);
        let mut poller = Poller::new(source, settings(1000, 50)).unwrap();

        assert!(poller.tick());
        let result = poller.wait().await;
        assert_eq!(result, Err(FetchError::Timeout(Duration::from_millis(50))));
    }

    #[tokio::test]
    async fn test_result_after_stop_is_discarded() {
        let source = GatedSource::new(vec![BuildPlan::new("a", "A")]);
        let mut poller = Poller::new(source.clone(), settings(1000, 60_000)).unwrap();
        let mut observer = Recorded::default();

        assert!(poller.tick());
        poller.stop();
        assert!(!poller.tick());

        source.gate.add_permits(1);
        let result = poller.wait().await;
        assert!(result.is_ok());
        poller.complete(result, &mut observer);

        assert!(observer.snapshots.is_empty());
        assert!(poller.previous().is_empty());
    }
}
