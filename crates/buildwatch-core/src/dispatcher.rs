//! Routes classified events to the visual and spoken notification channels.
//!
//! The dispatcher decides only *whether* and *what* to notify. *How* a
//! balloon is drawn or an utterance is synthesized belongs to the
//! [`VisualSink`] and [`SpeechSink`] implementations supplied by the
//! front-end.

use std::collections::HashSet;
use std::time::Duration;

use log::{debug, warn};

use crate::config::NotificationSettings;
use crate::error::FetchError;
use crate::models::{NotificationEvent, Severity};

pub const CONNECTION_ERROR_CAPTION: &str = "Server Connection Error";

/// A balloon/toast to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualNotification {
    pub caption: String,
    pub message: String,
    pub severity: Severity,
    /// How long the balloon should stay up
    pub timeout: Duration,
}

/// Output port for balloon/toast notifications.
pub trait VisualSink: Send {
    fn show(&mut self, notification: &VisualNotification);
}

/// Output port for spoken notifications.
pub trait SpeechSink: Send {
    /// Whether the synthesizer knows this voice. Unknown voices disable the
    /// spoken channel.
    fn supports_voice(&self, voice_id: &str) -> bool {
        !voice_id.is_empty()
    }

    fn speak(&mut self, utterance: &str, voice_id: &str);
}

/// Filters events against the notification settings and fans them out.
pub struct Dispatcher {
    visual: Box<dyn VisualSink>,
    speech: Box<dyn SpeechSink>,
    rejected_voices: HashSet<String>,
}

impl Dispatcher {
    pub fn new(visual: Box<dyn VisualSink>, speech: Box<dyn SpeechSink>) -> Self {
        Self {
            visual,
            speech,
            rejected_voices: HashSet::new(),
        }
    }

    /// Sends every event to zero, one or both channels.
    pub fn dispatch(&mut self, events: &[NotificationEvent], settings: &NotificationSettings) {
        if events.is_empty() {
            return;
        }
        let speak = settings.spoken_enabled && self.voice_available(&settings.voice_id);

        for event in events {
            if settings.visual_enabled && settings.visual_kinds.contains(&event.kind) {
                debug!("Showing {} notification for {}", event.kind, event.plan_key);
                self.visual.show(&VisualNotification {
                    caption: event.caption(),
                    message: event.kind.message().to_string(),
                    severity: event.severity,
                    timeout: settings.balloon_timeout,
                });
            }

            if speak && settings.spoken_kinds.contains(&event.kind) {
                debug!("Speaking {} notification for {}", event.kind, event.plan_key);
                self.speech.speak(&event.utterance(), &settings.voice_id);
            }
        }
    }

    /// Reports a failed fetch. Only the transition into the offline state
    /// raises a balloon; repeated failures stay quiet. The balloon is shown
    /// even when build notifications are turned off.
    pub fn connection_error(
        &mut self,
        error: &FetchError,
        entered_offline: bool,
        settings: &NotificationSettings,
    ) {
        if !entered_offline {
            debug!("Still offline, suppressing connection error notification");
            return;
        }

        self.visual.show(&VisualNotification {
            caption: CONNECTION_ERROR_CAPTION.to_string(),
            message: format!("Unable to connect to the server. Error: \n{error}"),
            severity: Severity::Error,
            timeout: settings.balloon_timeout,
        });
    }

    fn voice_available(&mut self, voice_id: &str) -> bool {
        if self.speech.supports_voice(voice_id) {
            return true;
        }
        if self.rejected_voices.insert(voice_id.to_string()) {
            warn!("Voice '{voice_id}' is not available, spoken notifications disabled");
        }
        false
    }
}
