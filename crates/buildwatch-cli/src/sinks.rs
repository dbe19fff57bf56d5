//! Terminal implementations of the monitor's output ports.

use buildwatch_core::{
    AggregateState, FetchError, OutputPorts, PresentationSink, Snapshot, SnapshotTable,
    SpeechSink, VisualNotification, VisualSink,
};
use log::{debug, warn};

use crate::renderer::TerminalRenderer;

pub fn ports(renderer: &TerminalRenderer) -> OutputPorts {
    OutputPorts {
        presentation: Box::new(PlanListSink::new(renderer.clone())),
        visual: Box::new(BalloonSink(renderer.clone())),
        speech: Box::new(SaySink(renderer.clone())),
    }
}

fn render(renderer: &TerminalRenderer, markdown: &str) {
    if let Err(e) = renderer.render(markdown) {
        warn!("Failed to write to terminal: {e}");
    }
}

/// Prints the plan list when it changes and the state when its icon does.
///
/// Animation frames are not printed; a terminal line per frame would drown
/// everything else. When the server goes offline the last list is printed
/// again with every row marked offline.
pub struct PlanListSink {
    renderer: TerminalRenderer,
    shown: Option<Snapshot>,
    icon: Option<&'static str>,
    offline: bool,
}

impl PlanListSink {
    pub fn new(renderer: TerminalRenderer) -> Self {
        Self {
            renderer,
            shown: None,
            icon: None,
            offline: false,
        }
    }

    fn plan_list(&mut self, snapshot: &Snapshot) -> Option<String> {
        let was_offline = std::mem::replace(&mut self.offline, false);
        let unchanged = self
            .shown
            .as_ref()
            .is_some_and(|shown| shown.plans() == snapshot.plans());
        if unchanged && !was_offline {
            return None;
        }
        self.shown = Some(snapshot.clone());
        Some(SnapshotTable::new(snapshot).to_string())
    }

    fn state_line(&mut self, state: &AggregateState) -> Option<String> {
        let icon = state.icon().as_str();
        if self.icon == Some(icon) {
            return None;
        }
        self.icon = Some(icon);
        Some(format!("**State:** {state}\n\n"))
    }

    fn offline_list(&mut self, error: &FetchError) -> Option<String> {
        if self.offline {
            return None;
        }
        self.offline = true;
        debug!("Plan list is stale: {error}");
        let shown = self.shown.as_ref()?;
        Some(SnapshotTable::new(shown).offline(true).to_string())
    }
}

impl PresentationSink for PlanListSink {
    fn snapshot_updated(&mut self, snapshot: &Snapshot) {
        if let Some(markdown) = self.plan_list(snapshot) {
            render(&self.renderer, &markdown);
        }
    }

    fn aggregate_state_changed(&mut self, state: &AggregateState) {
        if let Some(markdown) = self.state_line(state) {
            render(&self.renderer, &markdown);
        }
    }

    fn connection_error(&mut self, error: &FetchError) {
        if let Some(markdown) = self.offline_list(error) {
            render(&self.renderer, &markdown);
        }
    }
}

pub struct BalloonSink(TerminalRenderer);

impl VisualSink for BalloonSink {
    fn show(&mut self, notification: &VisualNotification) {
        render(&self.0, &format!("{notification}\n\n"));
    }
}

/// Stands in for a speech synthesizer by printing what would be said.
pub struct SaySink(TerminalRenderer);

impl SpeechSink for SaySink {
    fn speak(&mut self, utterance: &str, voice_id: &str) {
        render(&self.0, &format!("say ({voice_id}): {utterance}\n\n"));
    }
}

#[cfg(test)]
mod tests {
    use buildwatch_core::BuildPlan;

    use super::*;

    fn sink() -> PlanListSink {
        PlanListSink::new(TerminalRenderer::new(false))
    }

    fn refused() -> FetchError {
        FetchError::Network("connection refused".to_string())
    }

    #[test]
    fn test_plan_list_printed_on_change_only() {
        let mut sink = sink();
        let snapshot = Snapshot::new(vec![BuildPlan::new("A", "Alpha")]).unwrap();

        assert!(sink.plan_list(&snapshot).is_some());
        assert!(sink.plan_list(&snapshot.clone()).is_none());

        let changed = Snapshot::new(vec![BuildPlan::new("A", "Alpha").broken(true)]).unwrap();
        let output = sink.plan_list(&changed).unwrap();
        assert!(output.contains("- Status: Failed"));
    }

    #[test]
    fn test_connection_error_marks_list_offline() {
        let mut sink = sink();
        let snapshot = Snapshot::new(vec![
            BuildPlan::new("A", "Alpha").active(true),
            BuildPlan::new("B", "Beta").broken(true),
        ])
        .unwrap();
        sink.plan_list(&snapshot);

        let output = sink.offline_list(&refused()).unwrap();
        assert_eq!(output.matches("- Status: Offline").count(), 2);
        assert!(output.contains("### ○ Alpha (A)"));

        // Still offline: nothing new to show.
        assert!(sink.offline_list(&refused()).is_none());

        // Back online the same plans are listed again with their real status.
        let output = sink.plan_list(&snapshot).unwrap();
        assert!(output.contains("- Status: Building"));
        assert!(!output.contains("Offline"));
    }

    #[test]
    fn test_connection_error_before_any_list() {
        let mut sink = sink();
        assert!(sink.offline_list(&refused()).is_none());
        assert!(sink.offline);
    }

    #[test]
    fn test_state_printed_once_per_icon() {
        let mut sink = sink();
        let building = AggregateState {
            building: true,
            ..Default::default()
        };

        assert!(sink.state_line(&building).is_some());
        assert!(sink
            .state_line(&AggregateState {
                animation_frame: 2,
                ..building
            })
            .is_none());

        let line = sink.state_line(&AggregateState::default()).unwrap();
        assert_eq!(line, "**State:** ✓ healthy\n\n");
    }
}
