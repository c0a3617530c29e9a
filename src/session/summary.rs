use chrono::{DateTime, Utc};

use crate::models::{Event, HistoryEntry, SessionSummary};

/// Local session data a summary is computed from.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub score: u32,
    pub history: Vec<HistoryEntry>,
    pub events: Vec<Event>,
}

/// `max_level` falls back to the current score when the history is empty,
/// and `mean_probability` does the same when no events were recorded.
pub fn summarize(
    report: &SessionReport,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
) -> SessionSummary {
    let elapsed_ms = (ended_at - started_at).num_milliseconds().max(0);
    let duration_seconds = (elapsed_ms as f64 / 1000.0).round() as i64;

    let max_level = report
        .history
        .iter()
        .map(|entry| entry.value)
        .max()
        .unwrap_or(report.score);

    let mean_probability = if report.events.is_empty() {
        report.score
    } else {
        let total: u64 = report
            .events
            .iter()
            .map(|event| u64::from(event.probability_snapshot))
            .sum();
        (total as f64 / report.events.len() as f64).round() as u32
    };

    SessionSummary {
        ended_at,
        duration_seconds,
        max_level,
        mean_probability,
        total_events: report.events.len() as u64,
    }
}
