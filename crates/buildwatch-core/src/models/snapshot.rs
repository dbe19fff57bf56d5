//! Immutable per-cycle snapshot of every known plan.

use std::collections::HashMap;

use jiff::Timestamp;

use super::BuildPlan;
use crate::error::FetchError;

/// All plan states captured atomically by one poll cycle.
///
/// A snapshot is never merged with another one; each fully replaces the
/// previous as the comparison baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    plans: Vec<BuildPlan>,
    index: HashMap<String, usize>,
    captured_at: Timestamp,
}

impl Snapshot {
    /// Builds a snapshot, rejecting duplicate plan keys.
    pub fn new(plans: Vec<BuildPlan>) -> Result<Self, FetchError> {
        Self::with_timestamp(plans, Timestamp::now())
    }

    /// Builds a snapshot stamped with an explicit capture time.
    pub fn with_timestamp(plans: Vec<BuildPlan>, captured_at: Timestamp) -> Result<Self, FetchError> {
        let mut index = HashMap::with_capacity(plans.len());
        for (pos, plan) in plans.iter().enumerate() {
            if index.insert(plan.plan_key.clone(), pos).is_some() {
                return Err(FetchError::MalformedResponse(format!(
                    "duplicate plan key '{}'",
                    plan.plan_key
                )));
            }
        }
        Ok(Self {
            plans,
            index,
            captured_at,
        })
    }

    /// The baseline before the first successful fetch.
    pub fn empty() -> Self {
        Self {
            plans: Vec::new(),
            index: HashMap::new(),
            captured_at: Timestamp::UNIX_EPOCH,
        }
    }

    pub fn plans(&self) -> &[BuildPlan] {
        &self.plans
    }

    pub fn get(&self, plan_key: &str) -> Option<&BuildPlan> {
        self.index.get(plan_key).map(|&pos| &self.plans[pos])
    }

    pub fn timestamp(&self) -> Timestamp {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildPlan> {
        self.plans.iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a BuildPlan;
    type IntoIter = std::slice::Iter<'a, BuildPlan>;

    fn into_iter(self) -> Self::IntoIter {
        self.plans.iter()
    }
}
