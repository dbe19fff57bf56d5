//! Derives the single aggregate display state.
//!
//! Snapshot recomputation and animation ticks are separate operations because
//! they run on different cadences: the poll interval and the (faster) icon
//! animation interval.

use log::debug;

use crate::models::{AggregateState, Snapshot};

/// Advances the in-progress animation by one tick.
///
/// The frame moves forward by one (wrapping at `frame_count`) while something
/// is building and animation is enabled; otherwise it resets to zero. A
/// `frame_count` below one behaves like a single frame.
pub fn next_frame(frame: usize, building: bool, enabled: bool, frame_count: usize) -> usize {
    let frame_count = frame_count.max(1);
    if building && enabled {
        (frame + 1) % frame_count
    } else {
        0
    }
}

/// Owner of the aggregate state between cycles.
#[derive(Debug, Default)]
pub struct Aggregator {
    state: AggregateState,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AggregateState {
        self.state
    }

    /// Recomputes building/broken from a freshly fetched snapshot and clears
    /// the offline flag.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> AggregateState {
        let building = snapshot.iter().any(|p| p.build_active);
        let broken = snapshot.iter().any(|p| p.build_broken);

        if self.state.offline {
            debug!("Leaving offline state");
        }
        self.state.building = building;
        self.state.broken = broken;
        self.state.offline = false;
        if !building {
            self.state.animation_frame = 0;
        }
        self.state
    }

    /// Enters the offline state. Returns true when this is a transition, i.e.
    /// the state was not already offline.
    pub fn set_offline(&mut self) -> bool {
        let entered = !self.state.offline;
        self.state.offline = true;
        self.state.building = false;
        self.state.animation_frame = 0;
        entered
    }

    /// Runs one animation tick. Suspended while offline.
    pub fn tick(&mut self, enabled: bool, frame_count: usize) -> AggregateState {
        let building = self.state.building && !self.state.offline;
        self.state.animation_frame =
            next_frame(self.state.animation_frame, building, enabled, frame_count);
        self.state
    }
}
