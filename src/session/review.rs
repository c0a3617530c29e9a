//! After-the-fact reading of a finalized session's event log.

use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::Serialize;

use crate::models::{EventKind, Session, SessionEvent};

/// Three blinks inside this span count as a burst.
const BLINK_BURST_SECS: i64 = 5;
/// Probability jump between consecutive events that counts as abrupt.
const ABRUPT_CHANGE: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinuteBucket {
    pub blinks: u32,
    pub yawns: u32,
    pub microsleeps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotableKind {
    Yawn,
    ModerateMicrosleep,
    CriticalMicrosleep,
    BlinkBurst,
    AbruptRise,
    AbruptDrop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotableMoment {
    pub kind: NotableKind,
    pub timestamp: DateTime<Utc>,
    pub probability: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReview {
    pub per_minute: BTreeMap<DateTime<Utc>, MinuteBucket>,
    pub notable: Vec<NotableMoment>,
}

pub fn review_session(session: &Session) -> SessionReview {
    SessionReview {
        per_minute: bucket_by_minute(&session.events),
        notable: notable_moments(&session.events),
    }
}

fn bucket_by_minute(events: &[SessionEvent]) -> BTreeMap<DateTime<Utc>, MinuteBucket> {
    let mut buckets: BTreeMap<DateTime<Utc>, MinuteBucket> = BTreeMap::new();

    for event in events {
        let minute = event
            .timestamp
            .duration_trunc(TimeDelta::minutes(1))
            .unwrap_or(event.timestamp);
        let bucket = buckets.entry(minute).or_default();
        match event.kind {
            EventKind::Blink => bucket.blinks += 1,
            EventKind::Yawn => bucket.yawns += 1,
            kind if kind.is_microsleep() => bucket.microsleeps += 1,
            _ => {}
        }
    }

    buckets
}

fn notable_moments(events: &[SessionEvent]) -> Vec<NotableMoment> {
    let mut notable = Vec::new();
    let mut push = |kind, event: &SessionEvent| {
        notable.push(NotableMoment {
            kind,
            timestamp: event.timestamp,
            probability: event.probability,
        })
    };

    for (index, event) in events.iter().enumerate() {
        match event.kind {
            EventKind::Yawn => push(NotableKind::Yawn, event),
            EventKind::ModerateMicrosleep => push(NotableKind::ModerateMicrosleep, event),
            EventKind::CriticalMicrosleep => push(NotableKind::CriticalMicrosleep, event),
            EventKind::Blink if index >= 2 => {
                let span = event.timestamp - events[index - 2].timestamp;
                if span <= TimeDelta::seconds(BLINK_BURST_SECS) {
                    push(NotableKind::BlinkBurst, event);
                }
            }
            _ => {}
        }

        if let Some(previous) = index.checked_sub(1).map(|prev| &events[prev]) {
            if event.probability.abs_diff(previous.probability) >= ABRUPT_CHANGE {
                let kind = if event.probability > previous.probability {
                    NotableKind::AbruptRise
                } else {
                    NotableKind::AbruptDrop
                };
                push(kind, event);
            }
        }
    }

    notable
}
