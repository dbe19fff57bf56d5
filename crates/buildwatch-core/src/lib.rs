//! Core library for the Buildwatch CI monitor.
//!
//! This crate polls a continuous-integration server for the state of its
//! build plans, detects when a build has just finished and how its outcome
//! relates to the previous one, and derives a single aggregate state for a
//! tray-style indicator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   PlanSource    │    │     Monitor     │    │  Output ports   │
//! │ (file, http)    │───▶│ poller, differ, │───▶│ (presentation,  │
//! │                 │    │ aggregator,     │    │  visual, speech)│
//! └─────────────────┘    │ dispatcher      │    └─────────────────┘
//!                        └─────────────────┘
//! ```
//!
//! - [`poller`]: single-flight fetch cycle owning the previous snapshot
//! - [`differ`]: classifies build-completion transitions
//! - [`aggregator`]: building/broken/offline state and icon animation
//! - [`dispatcher`]: routes notifications to the visual and spoken sinks
//! - [`monitor`]: the event loop combining all of the above
//! - [`display`]: markdown formatting for terminal front-ends
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use buildwatch_core::{FileSource, Monitor, MonitorConfig, OutputPorts};
//! # use buildwatch_core::{AggregateState, FetchError, Snapshot, SpeechSink, VisualNotification, VisualSink, PresentationSink};
//! # struct Quiet;
//! # impl PresentationSink for Quiet {
//! #     fn snapshot_updated(&mut self, _: &Snapshot) {}
//! #     fn aggregate_state_changed(&mut self, _: &AggregateState) {}
//! #     fn connection_error(&mut self, _: &FetchError) {}
//! # }
//! # impl VisualSink for Quiet { fn show(&mut self, _: &VisualNotification) {} }
//! # impl SpeechSink for Quiet { fn speak(&mut self, _: &str, _: &str) {} }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (_config_tx, config_rx) = tokio::sync::watch::channel(MonitorConfig::default());
//! let ports = OutputPorts {
//!     presentation: Box::new(Quiet),
//!     visual: Box::new(Quiet),
//!     speech: Box::new(Quiet),
//! };
//!
//! let monitor = Monitor::new(Arc::new(FileSource::new("plans.json")), config_rx, ports)?;
//! let handle = monitor.start();
//! // ...
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod differ;
pub mod dispatcher;
pub mod display;
pub mod error;
pub mod models;
pub mod monitor;
pub mod poller;
pub mod source;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use config::{KindSet, MonitorConfig, ServerConfig};
pub use dispatcher::{Dispatcher, SpeechSink, VisualNotification, VisualSink};
pub use display::{LocalDateTime, SnapshotTable};
pub use error::{FetchError, MonitorError, Result};
pub use models::{
    AggregateState, BuildPlan, NotificationEvent, NotificationKind, Severity, Snapshot, TrayIcon,
};
pub use monitor::{Monitor, MonitorHandle, OutputPorts, PresentationSink};
pub use poller::{PollObserver, Poller};
pub use source::{FileSource, HttpSource, PlanSource};
