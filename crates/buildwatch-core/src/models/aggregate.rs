//! Aggregate display state derived from a whole snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The single combined state shown by the tray icon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AggregateState {
    /// At least one plan is building (always false while offline)
    pub building: bool,
    /// At least one plan's latest completed build failed
    pub broken: bool,
    /// The last fetch failed
    pub offline: bool,
    /// Current frame of the in-progress animation, in `[0, N)`
    pub animation_frame: usize,
}

/// Which indicator the tray should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIcon {
    Offline,
    Building { frame: usize },
    Broken,
    Healthy,
}

impl AggregateState {
    /// Resolves display precedence: offline, then building, then broken.
    pub fn icon(&self) -> TrayIcon {
        if self.offline {
            TrayIcon::Offline
        } else if self.building {
            TrayIcon::Building {
                frame: self.animation_frame,
            }
        } else if self.broken {
            TrayIcon::Broken
        } else {
            TrayIcon::Healthy
        }
    }
}

impl TrayIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrayIcon::Offline => "offline",
            TrayIcon::Building { .. } => "building",
            TrayIcon::Broken => "broken",
            TrayIcon::Healthy => "healthy",
        }
    }

    /// Status glyph used by text front-ends.
    pub fn glyph(&self) -> &'static str {
        match self {
            TrayIcon::Offline => "○",
            TrayIcon::Building { frame } => match frame % 4 {
                0 => "◐",
                1 => "◓",
                2 => "◑",
                _ => "◒",
            },
            TrayIcon::Broken => "✗",
            TrayIcon::Healthy => "✓",
        }
    }
}

impl fmt::Display for TrayIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_overrides_broken() {
        let state = AggregateState {
            building: true,
            broken: true,
            offline: false,
            animation_frame: 2,
        };
        assert_eq!(state.icon(), TrayIcon::Building { frame: 2 });
    }

    #[test]
    fn test_broken_over_healthy() {
        let state = AggregateState {
            broken: true,
            ..Default::default()
        };
        assert_eq!(state.icon(), TrayIcon::Broken);
        assert_eq!(AggregateState::default().icon(), TrayIcon::Healthy);
    }

    #[test]
    fn test_offline_wins() {
        let state = AggregateState {
            broken: true,
            offline: true,
            ..Default::default()
        };
        assert_eq!(state.icon(), TrayIcon::Offline);
        assert_eq!(state.icon().to_string(), "○ offline");
    }
}
