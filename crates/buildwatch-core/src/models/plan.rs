//! Build plan records as reported by the CI server.

use serde::{Deserialize, Serialize};

/// One monitored plan at one point in time.
///
/// This is also the wire format of the plan sources: a JSON array of these
/// records with camelCase keys. Only `planKey` and `planName` are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// Opaque identifier, stable across polls
    pub plan_key: String,
    pub plan_name: String,
    #[serde(default)]
    pub short_plan_name: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub server_name: String,
    /// A build is currently running
    #[serde(default)]
    pub build_active: bool,
    /// The latest completed build failed
    #[serde(default)]
    pub build_broken: bool,
    #[serde(default)]
    pub last_build_time: String,
    #[serde(default)]
    pub last_build_duration: String,
    #[serde(default)]
    pub last_build_number: String,
    #[serde(default)]
    pub last_vcs_revision: String,
    #[serde(default)]
    pub successful_test_count: u32,
    #[serde(default)]
    pub failed_test_count: u32,
    #[serde(default)]
    pub result_url: String,
}

impl BuildPlan {
    /// Creates a plan with only its identity set; everything else idle and green.
    pub fn new(plan_key: impl Into<String>, plan_name: impl Into<String>) -> Self {
        Self {
            plan_key: plan_key.into(),
            plan_name: plan_name.into(),
            ..Default::default()
        }
    }

    /// Sets the activity flag.
    pub fn active(mut self, build_active: bool) -> Self {
        self.build_active = build_active;
        self
    }

    /// Sets the status flag.
    pub fn broken(mut self, build_broken: bool) -> Self {
        self.build_broken = build_broken;
        self
    }

    /// Row label for list views. Activity wins over status.
    pub fn status_label(&self) -> &'static str {
        if self.build_active {
            "Building"
        } else if self.build_broken {
            "Failed"
        } else {
            "Successful"
        }
    }
}
