//! Notification kinds and the events the differ classifies.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Classification of a build-completion transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NotificationKind {
    /// Previous build failed, this one passed
    Fixed,
    /// Previous build passed, this one failed
    Broken,
    /// Passed twice in a row
    Succeeded,
    /// Failed twice in a row
    StillBroken,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Fixed,
        NotificationKind::Broken,
        NotificationKind::Succeeded,
        NotificationKind::StillBroken,
    ];

    /// Short label appended to the plan name in notification captions.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::Fixed => "Fixed!",
            NotificationKind::Broken | NotificationKind::StillBroken => "Broken!",
            NotificationKind::Succeeded => "Build Successful!",
        }
    }

    /// Body text shown in the balloon and spoken after "reports".
    pub fn message(&self) -> &'static str {
        match self {
            NotificationKind::Fixed => "Recent checkins have fixed the build.",
            NotificationKind::Broken => "Recent checkins have broken the build.",
            NotificationKind::Succeeded => "Yet another successful build.",
            NotificationKind::StillBroken => "The build is still broken.",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            NotificationKind::Fixed | NotificationKind::Succeeded => Severity::Info,
            NotificationKind::Broken | NotificationKind::StillBroken => Severity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Fixed => "Fixed",
            NotificationKind::Broken => "Broken",
            NotificationKind::Succeeded => "Succeeded",
            NotificationKind::StillBroken => "StillBroken",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(NotificationKind::Fixed),
            "broken" => Ok(NotificationKind::Broken),
            "succeeded" | "successful" => Ok(NotificationKind::Succeeded),
            "stillbroken" | "still_broken" => Ok(NotificationKind::StillBroken),
            _ => Err(format!("Invalid notification kind: {s}")),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly a notification should be presented.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// One classified build-completion transition.
///
/// Created, dispatched and discarded within a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub plan_key: String,
    pub plan_name: String,
    pub kind: NotificationKind,
    pub severity: Severity,
}

impl NotificationEvent {
    pub fn new(plan_key: impl Into<String>, plan_name: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            plan_key: plan_key.into(),
            plan_name: plan_name.into(),
            kind,
            severity: kind.severity(),
        }
    }

    /// `"<planName>: <kindLabel>"`
    pub fn caption(&self) -> String {
        format!("{}: {}", self.plan_name, self.kind.label())
    }

    /// `"<planName> reports <message>"`
    pub fn utterance(&self) -> String {
        format!("{} reports {}", self.plan_name, self.kind.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(NotificationKind::Fixed.severity(), Severity::Info);
        assert_eq!(NotificationKind::Succeeded.severity(), Severity::Info);
        assert_eq!(NotificationKind::Broken.severity(), Severity::Error);
        assert_eq!(NotificationKind::StillBroken.severity(), Severity::Error);
    }

    #[test]
    fn test_caption_and_utterance() {
        let event = NotificationEvent::new("API-MAIN", "Api", NotificationKind::StillBroken);
        assert_eq!(event.caption(), "Api: Broken!");
        assert_eq!(event.utterance(), "Api reports The build is still broken.");
        assert_eq!(event.severity, Severity::Error);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("still_broken".parse(), Ok(NotificationKind::StillBroken));
        assert_eq!("Fixed".parse(), Ok(NotificationKind::Fixed));
        assert!("exploded".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_kind_serde_uses_variant_names() {
        let json = serde_json::to_string(&NotificationKind::ALL).unwrap();
        assert_eq!(json, r#"["Fixed","Broken","Succeeded","StillBroken"]"#);
    }
}
