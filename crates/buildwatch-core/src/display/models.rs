//! Display implementations for domain models.

use std::fmt;

use crate::dispatcher::VisualNotification;
use crate::models::{AggregateState, NotificationEvent, Severity};

impl fmt::Display for AggregateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.icon())?;
        if self.building && self.broken {
            write!(f, " (last completed build failed)")?;
        }
        Ok(())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.caption(), self.kind.message())
    }
}

impl fmt::Display for VisualNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.severity {
            Severity::Info => "**",
            Severity::Error => "*",
        };
        write!(f, "{marker}{}{marker} {}", self.caption, self.message.replace('\n', " "))
    }
}
