//! Classifies per-plan transitions between two snapshots.
//!
//! Only one edge is examined: a plan that was building in the previous
//! snapshot and is idle in the current one has just finished a build. Its
//! outcome is then compared with the outcome recorded before the build:
//!
//! | previous | current | kind          |
//! |----------|---------|---------------|
//! | broken   | green   | `Fixed`       |
//! | green    | broken  | `Broken`      |
//! | green    | green   | `Succeeded`   |
//! | broken   | broken  | `StillBroken` |
//!
//! Plans that are still building, that were already idle, or that have no
//! counterpart in the previous snapshot produce nothing. A notification
//! therefore fires exactly once, at the moment a build finishes.

use crate::models::{BuildPlan, NotificationEvent, NotificationKind, Snapshot};

/// Classifies the transition of a single matched plan.
pub fn classify(prev: &BuildPlan, curr: &BuildPlan) -> Option<NotificationKind> {
    if !prev.build_active || curr.build_active {
        return None;
    }

    let kind = match (prev.build_broken, curr.build_broken) {
        (true, false) => NotificationKind::Fixed,
        (false, true) => NotificationKind::Broken,
        (false, false) => NotificationKind::Succeeded,
        (true, true) => NotificationKind::StillBroken,
    };
    Some(kind)
}

/// Produces the events for every plan of `curr` that just finished a build,
/// in the order the plans appear in `curr`.
pub fn diff(prev: &Snapshot, curr: &Snapshot) -> Vec<NotificationEvent> {
    curr.iter()
        .filter_map(|plan| {
            let last = prev.get(&plan.plan_key)?;
            let kind = classify(last, plan)?;
            Some(NotificationEvent::new(
                plan.plan_key.clone(),
                plan.plan_name.clone(),
                kind,
            ))
        })
        .collect()
}
