use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use super::{
    alert::{Alert, DrowsinessLevel},
    config::AnalysisConfig,
    eye::{EyeClosureMachine, EyeEvent},
    features::{self, FaceFeatures, SampleError},
    mouth::MouthApertureMachine,
    regulator::ProbabilityRegulator,
};
use crate::ledger::{EventLedger, EventSender};
use crate::models::{Event, EventKind, HistoryEntry, Sample};
use crate::session::SessionReport;

/// Session-long tallies shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCounters {
    pub blinks: u32,
    pub microsleeps: u32,
    pub yawns: u32,
}

/// Result of one accepted sample.
#[derive(Debug, Clone)]
pub struct SampleOutcome {
    pub features: FaceFeatures,
    pub events: Vec<Event>,
    pub score: u32,
}

/// Read-only view handed to the UI collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub score: u32,
    pub level: DrowsinessLevel,
    pub recommendation: &'static str,
    pub alert: Option<Alert>,
    pub counters: EventCounters,
    pub window_blinks: u32,
    pub events: Vec<Event>,
    pub history: Vec<HistoryEntry>,
    pub session_id: Option<String>,
}

/// Per-sample analysis for one monitored face.
///
/// Every sample goes feature extraction → eye machine → mouth machine → idle
/// decay → blink escalation, and everything it produces (score changes and
/// local events) is applied before the call returns. Not shared across
/// threads; the owner serializes access.
pub struct DrowsinessEngine {
    config: AnalysisConfig,
    eye: EyeClosureMachine,
    mouth: MouthApertureMachine,
    regulator: ProbabilityRegulator,
    ledger: EventLedger,
    counters: EventCounters,
}

impl DrowsinessEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            eye: EyeClosureMachine::new(),
            mouth: MouthApertureMachine::new(),
            regulator: ProbabilityRegulator::new(),
            ledger: EventLedger::new(),
            counters: EventCounters::default(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.regulator.score()
    }

    pub fn counters(&self) -> EventCounters {
        self.counters
    }

    pub fn events(&self) -> &[Event] {
        self.ledger.events()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.regulator.history()
    }

    pub fn regulator(&self) -> &ProbabilityRegulator {
        &self.regulator
    }

    pub fn eye(&self) -> &EyeClosureMachine {
        &self.eye
    }

    pub fn mouth(&self) -> &MouthApertureMachine {
        &self.mouth
    }

    /// Mirror future events to the remote store under `session_id`.
    pub fn attach_session(&mut self, session_id: String, sender: EventSender) {
        self.ledger.attach(session_id, sender);
    }

    pub fn session_id(&self) -> Option<&str> {
        self.ledger.session_id()
    }

    /// Rejected samples leave every machine untouched, cooldowns included.
    pub fn process(&mut self, sample: &Sample) -> Result<SampleOutcome, SampleError> {
        let features = features::extract(&sample.landmarks, &self.config.landmarks)
            .inspect_err(|err| debug!("sample at {} rejected: {err}", sample.captured_at))?;
        let now = sample.captured_at;
        let mut fired = Vec::new();

        self.regulator.tick(now);

        if let Some(eye_event) = self.eye.update(features.avg_ear(), now, &self.config) {
            fired.push(self.apply_eye_event(eye_event, now));
        }

        if self.mouth.update(features.mouth_aperture(), now, &self.config) {
            let score = self.regulator.increase(self.config.yawn_delta, now);
            self.counters.yawns += 1;
            fired.push(self.record(EventKind::Yawn, score, now));
        }

        if let Some(score) = self.regulator.decay_if_idle(now, &self.config) {
            fired.push(self.record(EventKind::IdleDecay, score, now));
        }

        if let Some(score) = self.regulator.escalate_if_frequent(now, &self.config) {
            fired.push(self.record(EventKind::ElevatedBlinks, score, now));
        }

        Ok(SampleOutcome {
            features,
            events: fired,
            score: self.regulator.score(),
        })
    }

    fn apply_eye_event(&mut self, eye_event: EyeEvent, now: DateTime<Utc>) -> Event {
        match eye_event {
            EyeEvent::CriticalMicrosleep => {
                let score = self
                    .regulator
                    .increase(self.config.critical_microsleep_delta, now);
                self.counters.microsleeps += 1;
                self.record(EventKind::CriticalMicrosleep, score, now)
            }
            EyeEvent::ModerateMicrosleep => {
                let score = self
                    .regulator
                    .increase(self.config.moderate_microsleep_delta, now);
                self.counters.microsleeps += 1;
                self.record(EventKind::ModerateMicrosleep, score, now)
            }
            EyeEvent::Blink => {
                self.regulator.record_blink();
                self.regulator.mark_event(now);
                self.counters.blinks += 1;
                self.record(EventKind::Blink, self.regulator.score(), now)
            }
        }
    }

    fn record(&mut self, kind: EventKind, score: u32, now: DateTime<Utc>) -> Event {
        match kind {
            EventKind::Blink => debug!("{kind} at {now}, score {score}"),
            _ => info!("{kind} at {now}, score {score}"),
        }
        self.ledger.record(kind, score, now)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let score = self.regulator.score();
        let level = DrowsinessLevel::from_score(score);
        EngineSnapshot {
            score,
            level,
            recommendation: level.recommendation(),
            alert: Alert::evaluate(self.ledger.last(), score),
            counters: self.counters,
            window_blinks: self.regulator.window().blink_count,
            events: self.ledger.events().to_vec(),
            history: self.regulator.history().to_vec(),
            session_id: self.ledger.session_id().map(str::to_string),
        }
    }

    /// Data the session summary is computed from.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            score: self.regulator.score(),
            history: self.regulator.history().to_vec(),
            events: self.ledger.events().to_vec(),
        }
    }

    /// Back to the just-constructed state: machines, counters, score, history,
    /// events and session attachment.
    pub fn reset(&mut self) {
        self.eye.reset();
        self.mouth.reset();
        self.regulator.reset();
        self.ledger.clear();
        self.counters = EventCounters::default();
    }
}

impl Default for DrowsinessEngine {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
