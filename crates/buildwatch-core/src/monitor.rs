//! The monitor: one event loop tying poller, differ, aggregator and
//! dispatcher together.
//!
//! ```text
//!   poll tick ──▶ Poller ──fetch──▶ Snapshot ─┬─▶ Differ ──▶ Dispatcher ──▶ visual / speech sinks
//!                                              └─▶ Aggregator ─────────────▶ presentation sink
//!   animation tick ──────────────────────────────▶ Aggregator
//! ```
//!
//! Poll ticks, animation ticks, fetch completions, configuration changes and
//! the stop request are all handled by a single task, so the previous
//! snapshot, the offline flag and the animation counter are only ever
//! mutated from one place.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::aggregator::Aggregator;
use crate::config::{AnimationSettings, MonitorConfig};
use crate::differ;
use crate::dispatcher::{Dispatcher, SpeechSink, VisualSink};
use crate::error::{FetchError, Result};
use crate::models::{AggregateState, Snapshot};
use crate::poller::{FetchResult, PollObserver, Poller};
use crate::source::PlanSource;

/// Output port for the list view and the tray icon.
pub trait PresentationSink: Send {
    fn snapshot_updated(&mut self, snapshot: &Snapshot);

    /// Called after the first cycle and then whenever the state changes.
    fn aggregate_state_changed(&mut self, state: &AggregateState);

    fn connection_error(&mut self, error: &FetchError);
}

/// Every sink the monitor publishes to.
pub struct OutputPorts {
    pub presentation: Box<dyn PresentationSink>,
    pub visual: Box<dyn VisualSink>,
    pub speech: Box<dyn SpeechSink>,
}

/// Reacts to poll outcomes on behalf of the monitor.
struct Cycle {
    aggregator: Aggregator,
    dispatcher: Dispatcher,
    presentation: Box<dyn PresentationSink>,
    config: watch::Receiver<MonitorConfig>,
    published: Option<AggregateState>,
}

impl Cycle {
    fn publish(&mut self, state: AggregateState) {
        if self.published == Some(state) {
            return;
        }
        debug!("Aggregate state is now {}", state.icon());
        self.presentation.aggregate_state_changed(&state);
        self.published = Some(state);
    }

    fn animation_tick(&mut self) -> AggregateState {
        let animation = self.config.borrow().animation_settings();
        let state = self
            .aggregator
            .tick(animation.enabled, animation.frame_count);
        self.publish(state);
        state
    }
}

impl PollObserver for Cycle {
    fn on_snapshot(&mut self, previous: &Snapshot, current: &Snapshot) {
        let events = differ::diff(previous, current);
        let state = self.aggregator.apply_snapshot(current);

        self.presentation.snapshot_updated(current);
        self.publish(state);

        for event in &events {
            info!("{} ({}): {}", event.plan_name, event.plan_key, event.kind);
        }
        let settings = self.config.borrow().notification_settings();
        self.dispatcher.dispatch(&events, &settings);
    }

    fn on_error(&mut self, error: &FetchError) {
        warn!("Fetch failed: {error}");
        let entered_offline = self.aggregator.set_offline();
        if entered_offline {
            info!("Build server is offline");
        }

        self.presentation.connection_error(error);
        self.publish(self.aggregator.state());

        let settings = self.config.borrow().notification_settings();
        self.dispatcher
            .connection_error(error, entered_offline, &settings);
    }
}

/// Monitors a plan source until stopped.
pub struct Monitor {
    poller: Poller,
    cycle: Cycle,
}

impl Monitor {
    /// Builds a monitor. Configuration is read from `config` at the start of
    /// every cycle; send new values through the matching `watch::Sender` to
    /// reconfigure a running monitor.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Configuration` for a non-positive poll interval.
    pub fn new(
        source: Arc<dyn PlanSource>,
        config: watch::Receiver<MonitorConfig>,
        ports: OutputPorts,
    ) -> Result<Self> {
        let poll = {
            let current = config.borrow();
            current.warn_disabled_features();
            current.poll_settings()?
        };

        Ok(Self {
            poller: Poller::new(source, poll)?,
            cycle: Cycle {
                aggregator: Aggregator::new(),
                dispatcher: Dispatcher::new(ports.visual, ports.speech),
                presentation: ports.presentation,
                config,
                published: None,
            },
        })
    }

    pub fn state(&self) -> AggregateState {
        self.cycle.aggregator.state()
    }

    /// The baseline the next snapshot will be compared with.
    pub fn previous(&self) -> &Snapshot {
        self.poller.previous()
    }

    /// Issues a fetch unless one is outstanding. Returns whether it did.
    pub fn poll(&mut self) -> bool {
        self.poller.tick()
    }

    /// Waits for the outstanding fetch (pending forever if there is none).
    pub async fn wait_fetch(&mut self) -> FetchResult {
        self.poller.wait().await
    }

    /// Applies a fetch result: diff, aggregate, dispatch, new baseline.
    pub fn handle_fetch_result(&mut self, result: FetchResult) {
        self.poller.complete(result, &mut self.cycle);
    }

    /// Runs one complete cycle: fetch, wait, apply.
    pub async fn poll_once(&mut self) {
        if self.poll() {
            let result = self.wait_fetch().await;
            self.handle_fetch_result(result);
        }
    }

    /// Advances the building animation by one frame.
    pub fn animation_tick(&mut self) -> AggregateState {
        self.cycle.animation_tick()
    }

    /// Spawns the event loop on the current tokio runtime.
    pub fn start(self) -> MonitorHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        MonitorHandle {
            stop: stop_tx,
            task,
        }
    }

    async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let mut config = self.cycle.config.clone();
        let mut config_open = true;
        let mut animation = config.borrow_and_update().animation_settings();

        // The first poll tick fires immediately.
        let mut poll_timer = ticker(self.poller.interval(), Duration::ZERO);
        let mut animation_timer = ticker(animation.interval, animation.interval);
        let mut was_building = false;

        info!("Monitor started, polling every {:?}", self.poller.interval());

        loop {
            let building = self.state().building;
            if building && !was_building {
                animation_timer.reset();
            }
            was_building = building;

            tokio::select! {
                _ = stop.changed() => break,
                result = self.poller.wait(), if self.poller.is_in_flight() => {
                    self.handle_fetch_result(result);
                }
                changed = config.changed(), if config_open => {
                    if changed.is_err() {
                        config_open = false;
                        continue;
                    }
                    let current = config.borrow_and_update().clone();
                    self.reconfigure(&current, &mut animation, &mut poll_timer, &mut animation_timer);
                }
                _ = poll_timer.tick() => {
                    self.poll();
                }
                _ = animation_timer.tick(), if building => {
                    self.animation_tick();
                }
            }
        }

        self.poller.stop();
        info!("Monitor stopped");
    }

    fn reconfigure(
        &mut self,
        config: &MonitorConfig,
        animation: &mut AnimationSettings,
        poll_timer: &mut Interval,
        animation_timer: &mut Interval,
    ) {
        config.warn_disabled_features();

        match config.poll_settings() {
            Ok(poll) => {
                if poll.interval != self.poller.interval() {
                    info!("Poll interval changed to {:?}", poll.interval);
                    *poll_timer = ticker(poll.interval, poll.interval);
                }
                self.poller.update_settings(poll);
            }
            Err(e) => warn!("Keeping poll interval {:?}: {e}", self.poller.interval()),
        }

        let updated = config.animation_settings();
        if updated.interval != animation.interval {
            *animation_timer = ticker(updated.interval, updated.interval);
        }
        *animation = updated;
    }
}

fn ticker(period: Duration, first_after: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + first_after, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Handle to a running monitor.
pub struct MonitorHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Asks the event loop to stop. A fetch that is still in flight is
    /// abandoned and its result never applied.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Stops the monitor and waits for the event loop to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!("Monitor task ended abnormally: {e}");
        }
    }
}
