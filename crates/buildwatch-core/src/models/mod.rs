//! Data models for build plans, snapshots and notifications.
//!
//! Everything in here is plain data: the plan records delivered by a
//! [`crate::source::PlanSource`], the [`Snapshot`] that groups them per poll
//! cycle, the [`NotificationEvent`]s classified by [`crate::differ`], and the
//! [`AggregateState`] maintained by [`crate::aggregator`].

pub mod aggregate;
pub mod notification;
pub mod plan;
pub mod snapshot;

pub use aggregate::{AggregateState, TrayIcon};
pub use notification::{NotificationEvent, NotificationKind, Severity};
pub use plan::BuildPlan;
pub use snapshot::Snapshot;
