//! Mapping from score and latest event to what the user should be told.

use serde::Serialize;

use crate::models::{Event, EventKind};

/// Recommendation band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DrowsinessLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl DrowsinessLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => DrowsinessLevel::Low,
            30..=59 => DrowsinessLevel::Moderate,
            60..=79 => DrowsinessLevel::High,
            _ => DrowsinessLevel::Critical,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            DrowsinessLevel::Low => {
                "Attention looks healthy. Keep the pace and take short visual breaks."
            }
            DrowsinessLevel::Moderate => {
                "Early signs of tiredness. Take a minute to breathe and rest your eyes."
            }
            DrowsinessLevel::High => {
                "Concentration is dropping. A short break before continuing is recommended."
            }
            DrowsinessLevel::Critical => {
                "Drowsiness is very high and may affect your safety. Take a real break now."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertSeverity {
    Moderate,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: &'static str,
}

impl Alert {
    const fn new(severity: AlertSeverity, message: &'static str) -> Self {
        Self { severity, message }
    }

    /// The latest event wins over the score; with no alerting event the score
    /// decides, and below 40 there is nothing to show.
    pub fn evaluate(last_event: Option<&Event>, score: u32) -> Option<Alert> {
        match last_event.map(|event| event.kind) {
            Some(EventKind::CriticalMicrosleep) => {
                return Some(Alert::new(
                    AlertSeverity::Critical,
                    "Critical microsleep detected",
                ))
            }
            Some(EventKind::ModerateMicrosleep) => {
                return Some(Alert::new(AlertSeverity::High, "Moderate microsleep"))
            }
            Some(EventKind::ElevatedBlinks) => {
                return Some(Alert::new(AlertSeverity::Moderate, "Frequent blinking"))
            }
            _ => {}
        }

        match score {
            80.. => Some(Alert::new(AlertSeverity::Critical, "Critical drowsiness")),
            60..=79 => Some(Alert::new(AlertSeverity::High, "Elevated drowsiness")),
            40..=59 => Some(Alert::new(AlertSeverity::Moderate, "Moderate drowsiness")),
            _ => None,
        }
    }
}
