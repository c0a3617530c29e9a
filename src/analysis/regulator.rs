//! Bounded drowsiness score with its change log.

use chrono::{DateTime, Utc};

use super::config::AnalysisConfig;
use crate::models::HistoryEntry;

pub const MAX_SCORE: u32 = 100;

/// Blink tally over one escalation window, counted in samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkWindow {
    pub frame_count: u32,
    pub blink_count: u32,
}

/// Sole owner of the score. Every change is clamped to `[0, MAX_SCORE]` and
/// appended to the history with its post-update value.
#[derive(Debug, Clone, Default)]
pub struct ProbabilityRegulator {
    score: u32,
    history: Vec<HistoryEntry>,
    last_event_at: Option<DateTime<Utc>>,
    window: BlinkWindow,
}

impl ProbabilityRegulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn window(&self) -> BlinkWindow {
        self.window
    }

    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.last_event_at
    }

    pub fn increase(&mut self, delta: u32, at: DateTime<Utc>) -> u32 {
        let next = self.score.saturating_add(delta).min(MAX_SCORE);
        self.apply(next, at)
    }

    pub fn decrease(&mut self, delta: u32, at: DateTime<Utc>) -> u32 {
        let next = self.score.saturating_sub(delta).min(MAX_SCORE);
        self.apply(next, at)
    }

    fn apply(&mut self, next: u32, at: DateTime<Utc>) -> u32 {
        self.score = next;
        self.history.push(HistoryEntry {
            timestamp: at,
            value: next,
        });
        self.last_event_at = Some(at);
        self.window.frame_count = 0;
        next
    }

    /// Restarts the idle clock for events that carry no score change.
    pub fn mark_event(&mut self, at: DateTime<Utc>) {
        self.last_event_at = Some(at);
    }

    /// Advances the escalation window by one sample. The first sample after
    /// construction or reset also starts the idle clock.
    pub fn tick(&mut self, at: DateTime<Utc>) {
        self.last_event_at.get_or_insert(at);
        self.window.frame_count = self.window.frame_count.saturating_add(1);
    }

    pub fn record_blink(&mut self) {
        self.window.blink_count = self.window.blink_count.saturating_add(1);
    }

    /// Applies the idle decay when time since the last event lands inside the
    /// idle window. Returns the new score when it fired.
    pub fn decay_if_idle(&mut self, now: DateTime<Utc>, config: &AnalysisConfig) -> Option<u32> {
        let last = self.last_event_at?;
        let idle_ms = (now - last).num_milliseconds();

        if (config.idle_window_start_ms..config.idle_window_end_ms).contains(&idle_ms) {
            Some(self.decrease(config.idle_decay_delta, now))
        } else {
            None
        }
    }

    /// Closes the blink window once it spans a minute of samples. Returns the
    /// new score when the blink count warranted escalation; the window resets
    /// either way.
    pub fn escalate_if_frequent(
        &mut self,
        now: DateTime<Utc>,
        config: &AnalysisConfig,
    ) -> Option<u32> {
        if self.window.frame_count < config.samples_per_minute() {
            return None;
        }

        let escalated = (self.window.blink_count >= config.elevated_blink_count)
            .then(|| self.increase(config.elevated_blinks_delta, now));
        self.window = BlinkWindow::default();
        escalated
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
