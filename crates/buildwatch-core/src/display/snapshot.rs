//! Markdown listing of a snapshot's plans.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{BuildPlan, Snapshot, TrayIcon};

/// Lists every plan of a snapshot, one section per plan.
///
/// When `offline` is set every row is marked offline, since the data is only
/// as fresh as the last successful fetch.
///
/// # Examples
///
/// ```rust
/// use buildwatch_core::{BuildPlan, Snapshot, SnapshotTable};
///
/// let snapshot = Snapshot::new(vec![BuildPlan::new("API-MAIN", "Api").broken(true)]).unwrap();
/// let output = SnapshotTable::new(&snapshot).to_string();
/// assert!(output.contains("### ✗ Api (API-MAIN)"));
/// assert!(output.contains("Status: Failed"));
/// ```
pub struct SnapshotTable<'a> {
    snapshot: &'a Snapshot,
    offline: bool,
}

impl<'a> SnapshotTable<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            offline: false,
        }
    }

    /// Marks every row as offline.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    fn row_icon(&self, plan: &BuildPlan) -> TrayIcon {
        if self.offline {
            TrayIcon::Offline
        } else if plan.build_active {
            TrayIcon::Building { frame: 0 }
        } else if plan.build_broken {
            TrayIcon::Broken
        } else {
            TrayIcon::Healthy
        }
    }

    fn fmt_plan(&self, plan: &BuildPlan, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if plan.short_plan_name.is_empty() {
            &plan.plan_name
        } else {
            &plan.short_plan_name
        };
        writeln!(f, "### {} {} ({})", self.row_icon(plan).glyph(), name, plan.plan_key)?;
        writeln!(f)?;

        if !plan.server_name.is_empty() {
            writeln!(f, "- Server: {}", plan.server_name)?;
        }
        if !plan.project_name.is_empty() {
            writeln!(f, "- Project: {}", plan.project_name)?;
        }

        let status = if self.offline {
            "Offline"
        } else {
            plan.status_label()
        };
        writeln!(f, "- Status: {status}")?;

        if !plan.last_build_number.is_empty() {
            write!(f, "- Last build: #{}", plan.last_build_number)?;
            if !plan.last_build_time.is_empty() {
                write!(f, " at {}", plan.last_build_time)?;
            }
            if !plan.last_build_duration.is_empty() {
                write!(f, " ({})", plan.last_build_duration)?;
            }
            writeln!(f)?;
        }
        if !plan.last_vcs_revision.is_empty() {
            writeln!(f, "- Revision: {}", plan.last_vcs_revision)?;
        }
        if plan.successful_test_count > 0 || plan.failed_test_count > 0 {
            writeln!(
                f,
                "- Tests: {} passed, {} failed",
                plan.successful_test_count, plan.failed_test_count
            )?;
        }
        if !plan.result_url.is_empty() {
            writeln!(f, "- Result: {}", plan.result_url)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for SnapshotTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.snapshot.is_empty() {
            return writeln!(f, "No plans found.");
        }

        writeln!(
            f,
            "# Plans ({}, {})",
            self.snapshot.len(),
            LocalDateTime(&self.snapshot.timestamp())
        )?;
        writeln!(f)?;
        for plan in self.snapshot {
            self.fmt_plan(plan, f)?;
        }
        Ok(())
    }
}
