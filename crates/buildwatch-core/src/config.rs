//! Monitor configuration.
//!
//! The configuration is a JSON document with camelCase keys. Every field has
//! a default, so an empty object (or no file at all) is a valid
//! configuration. By default the file is looked up at
//! `$XDG_CONFIG_HOME/buildwatch/config.json`.
//!
//! Invalid values never abort the monitor. They disable the feature they
//! belong to instead: a non-positive animation interval turns animation off,
//! an empty kind set turns its notification channel off, an unknown kind name
//! is dropped from its set, and so on. The one
//! exception is the poll interval, without which there is nothing to run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::models::NotificationKind;

const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_POLL_INTERVAL_MS: i64 = 30_000;
pub const DEFAULT_FETCH_TIMEOUT_MS: i64 = 20_000;
pub const DEFAULT_ANIMATION_INTERVAL_MS: i64 = 300;
pub const DEFAULT_ANIMATION_FRAME_COUNT: i64 = 4;
pub const DEFAULT_BALLOON_TIMEOUT_MS: i64 = 5_000;

/// Notification kinds selected for one channel.
///
/// Names that match no kind are set aside instead of failing the whole
/// document, so a typo only narrows the channel. They are written back out
/// unchanged when the configuration is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KindSet {
    kinds: BTreeSet<NotificationKind>,
    unknown: Vec<String>,
}

impl KindSet {
    pub fn kinds(&self) -> &BTreeSet<NotificationKind> {
        &self.kinds
    }

    /// Names that did not parse as a notification kind.
    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl FromIterator<NotificationKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = NotificationKind>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
            unknown: Vec::new(),
        }
    }
}

impl From<Vec<String>> for KindSet {
    fn from(names: Vec<String>) -> Self {
        let mut set = Self::default();
        for name in names {
            match name.parse::<NotificationKind>() {
                Ok(kind) => {
                    set.kinds.insert(kind);
                }
                Err(_) => {
                    warn!("Ignoring unknown notification kind '{name}'");
                    set.unknown.push(name);
                }
            }
        }
        set
    }
}

impl From<KindSet> for Vec<String> {
    fn from(set: KindSet) -> Self {
        set.kinds
            .iter()
            .map(|kind| kind.as_str().to_string())
            .chain(set.unknown)
            .collect()
    }
}

/// Where plan records come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// URL of a JSON plan list
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Local JSON plan list, used instead of `url` when set
    pub file: Option<PathBuf>,
}

/// Settings supplied to the monitor, re-read at the start of every cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    pub server: ServerConfig,
    pub poll_interval_ms: i64,
    pub fetch_timeout_ms: i64,
    pub animation_enabled: bool,
    pub animation_frame_count: i64,
    pub animation_interval_ms: i64,
    pub visual_notifications_enabled: bool,
    pub visual_notification_kinds: KindSet,
    pub balloon_timeout_ms: i64,
    pub spoken_notifications_enabled: bool,
    pub spoken_notification_kinds: KindSet,
    pub voice_id: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            animation_enabled: true,
            animation_frame_count: DEFAULT_ANIMATION_FRAME_COUNT,
            animation_interval_ms: DEFAULT_ANIMATION_INTERVAL_MS,
            visual_notifications_enabled: true,
            visual_notification_kinds: NotificationKind::ALL.into_iter().collect(),
            balloon_timeout_ms: DEFAULT_BALLOON_TIMEOUT_MS,
            spoken_notifications_enabled: false,
            spoken_notification_kinds: [NotificationKind::Fixed, NotificationKind::Broken]
                .into_iter()
                .collect(),
            voice_id: String::new(),
        }
    }
}

/// Validated poll scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub fetch_timeout: Duration,
}

/// Validated icon animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSettings {
    pub enabled: bool,
    pub frame_count: usize,
    pub interval: Duration,
}

/// Validated notification routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub visual_enabled: bool,
    pub visual_kinds: BTreeSet<NotificationKind>,
    pub balloon_timeout: Duration,
    pub spoken_enabled: bool,
    pub spoken_kinds: BTreeSet<NotificationKind>,
    pub voice_id: String,
}

fn positive_ms(value: i64) -> Option<Duration> {
    u64::try_from(value)
        .ok()
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis)
}

impl MonitorConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one the XDG location is tried
    /// and a missing file yields the defaults. Returns the path that was
    /// actually read, if any.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };

        let Some(path) = path else {
            return Ok((Self::default(), None));
        };

        let config = Self::from_file(&path)?;
        Ok((config, Some(path)))
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| MonitorError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The existing configuration file in the XDG config directories.
    pub fn default_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("buildwatch").find_config_file(CONFIG_FILE)
    }

    /// Poll interval and fetch timeout.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Configuration` for a non-positive poll interval.
    pub fn poll_settings(&self) -> Result<PollSettings> {
        let interval = positive_ms(self.poll_interval_ms).ok_or_else(|| {
            MonitorError::config("pollIntervalMs")
                .with_reason(format!("must be positive, got {}", self.poll_interval_ms))
        })?;
        let fetch_timeout = positive_ms(self.fetch_timeout_ms)
            .unwrap_or(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS as u64));
        Ok(PollSettings {
            interval,
            fetch_timeout,
        })
    }

    pub fn animation_settings(&self) -> AnimationSettings {
        let frame_count = usize::try_from(self.animation_frame_count)
            .ok()
            .filter(|&n| n > 0);
        let interval = positive_ms(self.animation_interval_ms);

        match (frame_count, interval) {
            (Some(frame_count), Some(interval)) => AnimationSettings {
                enabled: self.animation_enabled,
                frame_count,
                interval,
            },
            _ => AnimationSettings {
                enabled: false,
                frame_count: 1,
                interval: Duration::from_millis(DEFAULT_ANIMATION_INTERVAL_MS as u64),
            },
        }
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            visual_enabled: self.visual_notifications_enabled
                && !self.visual_notification_kinds.is_empty(),
            visual_kinds: self.visual_notification_kinds.kinds().clone(),
            balloon_timeout: positive_ms(self.balloon_timeout_ms)
                .unwrap_or(Duration::from_millis(DEFAULT_BALLOON_TIMEOUT_MS as u64)),
            spoken_enabled: self.spoken_notifications_enabled
                && !self.spoken_notification_kinds.is_empty()
                && !self.voice_id.trim().is_empty(),
            spoken_kinds: self.spoken_notification_kinds.kinds().clone(),
            voice_id: self.voice_id.trim().to_string(),
        }
    }

    /// Human-readable reasons for every feature the configuration switches
    /// off through invalid values.
    pub fn disabled_features(&self) -> Vec<String> {
        let mut reasons = Vec::new();

        if self.poll_interval_ms <= 0 {
            reasons.push(format!(
                "polling: pollIntervalMs must be positive, got {}",
                self.poll_interval_ms
            ));
        }
        if self.fetch_timeout_ms <= 0 {
            reasons.push(format!(
                "fetch timeout: fetchTimeoutMs {} ignored, using {DEFAULT_FETCH_TIMEOUT_MS}",
                self.fetch_timeout_ms
            ));
        }
        if self.animation_enabled && self.animation_frame_count <= 0 {
            reasons.push(format!(
                "animation: animationFrameCount must be positive, got {}",
                self.animation_frame_count
            ));
        }
        if self.animation_enabled && self.animation_interval_ms <= 0 {
            reasons.push(format!(
                "animation: animationIntervalMs must be positive, got {}",
                self.animation_interval_ms
            ));
        }
        if self.visual_notifications_enabled && self.visual_notification_kinds.is_empty() {
            reasons.push("visual notifications: no notification kinds selected".to_string());
        }
        if self.spoken_notifications_enabled {
            if self.spoken_notification_kinds.is_empty() {
                reasons.push("spoken notifications: no notification kinds selected".to_string());
            }
            if self.voice_id.trim().is_empty() {
                reasons.push("spoken notifications: no voice selected".to_string());
            }
        }

        let channels = [
            ("visual notifications", &self.visual_notification_kinds),
            ("spoken notifications", &self.spoken_notification_kinds),
        ];
        for (channel, set) in channels {
            for name in set.unknown() {
                reasons.push(format!("{channel}: unknown notification kind '{name}' ignored"));
            }
        }

        reasons
    }

    /// Logs every disabled feature at warn level.
    pub fn warn_disabled_features(&self) {
        for reason in self.disabled_features() {
            warn!("Configuration disables {reason}");
        }
    }
}
