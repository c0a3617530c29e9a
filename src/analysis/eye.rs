use chrono::{DateTime, Utc};

use super::config::AnalysisConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeEvent {
    Blink,
    ModerateMicrosleep,
    CriticalMicrosleep,
}

/// Tracks how long both eyes have been closed and classifies the closure.
///
/// Closures under `blink_max_ms` are blinks, closures of at least
/// `moderate_microsleep_min_ms` are moderate microsleeps when the eye reopens,
/// and anything in between produces nothing. A closure that keeps going past
/// `critical_microsleep_ms` fires a critical microsleep without waiting for the
/// eye to reopen and restarts its own timer.
#[derive(Debug, Clone, Default)]
pub struct EyeClosureMachine {
    closed_since: Option<DateTime<Utc>>,
    cooldown: u32,
}

impl EyeClosureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EyeState {
        if self.closed_since.is_some() {
            EyeState::Closed
        } else {
            EyeState::Open
        }
    }

    /// Samples left before another microsleep may fire.
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn update(
        &mut self,
        avg_ear: f64,
        now: DateTime<Utc>,
        config: &AnalysisConfig,
    ) -> Option<EyeEvent> {
        self.cooldown = self.cooldown.saturating_sub(1);

        if avg_ear < config.ear_closed_threshold {
            let since = *self.closed_since.get_or_insert(now);
            let closed_ms = (now - since).num_milliseconds();

            if closed_ms > config.critical_microsleep_ms && self.cooldown == 0 {
                self.cooldown = config.microsleep_cooldown_samples();
                self.closed_since = None;
                return Some(EyeEvent::CriticalMicrosleep);
            }
            return None;
        }

        let since = self.closed_since.take()?;
        let closed_ms = (now - since).num_milliseconds();

        if closed_ms >= config.moderate_microsleep_min_ms && self.cooldown == 0 {
            self.cooldown = config.microsleep_cooldown_samples();
            Some(EyeEvent::ModerateMicrosleep)
        } else if closed_ms < config.blink_max_ms {
            Some(EyeEvent::Blink)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
