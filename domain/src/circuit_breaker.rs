use crate::command::{CommandError, ErrorKind};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Enabled,
    Disabled { until: DateTime<Utc> },
    /// Left only through [`CircuitBreakers::reset`].
    Broken,
}

/// Self-healing disable flags, one per top level command.
#[derive(Debug, Default)]
pub struct CircuitBreakers {
    states: Mutex<HashMap<String, BreakerState>>,
}

impl CircuitBreakers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, re-enabling an expired cooldown on the way.
    pub fn state(&self, command: &str, now: DateTime<Utc>) -> BreakerState {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        match states.get(command).copied() {
            Some(BreakerState::Disabled { until }) if until <= now => {
                states.remove(command);
                info!(command, "Command cooldown expired, re-enabled");
                BreakerState::Enabled
            }
            Some(state) => state,
            None => BreakerState::Enabled,
        }
    }

    pub fn check(&self, command: &str, now: DateTime<Utc>) -> Result<(), CommandError> {
        match self.state(command, now) {
            BreakerState::Enabled => Ok(()),
            BreakerState::Disabled { until } => Err(CommandError::Disabled {
                remaining: until - now,
            }),
            BreakerState::Broken => Err(CommandError::Broken),
        }
    }

    /// Trips the breaker if `kind` says the upstream is down or has changed.
    #[instrument(level = "debug", skip(self))]
    pub fn record_failure(
        &self,
        command: &str,
        kind: ErrorKind,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) {
        let next = match kind {
            ErrorKind::UpstreamUnavailable => BreakerState::Disabled {
                until: now + cooldown,
            },
            ErrorKind::MalformedResponse => BreakerState::Broken,
            _ => return,
        };

        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        if states.get(command) == Some(&BreakerState::Broken) {
            return;
        }
        warn!(command, state = ?next, "Command disabled after upstream failure");
        states.insert(command.to_string(), next);
    }

    /// Re-enables the command. Returns whether it was disabled.
    #[instrument(level = "info", skip(self))]
    pub fn reset(&self, command: &str) -> bool {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.remove(command).is_some()
    }
}

/// `45s`, `4m 5s` or `1h 0m 5s`.
pub fn format_cooldown_time(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    if total <= 60 {
        return format!("{total}s");
    }
    let (minutes, seconds) = (total / 60, total % 60);
    if total <= 3600 {
        return format!("{minutes}m {seconds}s");
    }
    format!("{}h {}m {seconds}s", minutes / 60, minutes % 60)
}
