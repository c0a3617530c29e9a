use chrono::{DateTime, Utc};

use super::config::AnalysisConfig;

/// Tracks a continuously open mouth and classifies it as a yawn.
///
/// Any sample at or below the aperture threshold, or any sample during the
/// cooldown, cancels the candidate so it has to start over.
#[derive(Debug, Clone, Default)]
pub struct MouthApertureMachine {
    open_since: Option<DateTime<Utc>>,
    cooldown: u32,
}

impl MouthApertureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open_since.is_some()
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Returns `true` when this sample completes a yawn.
    pub fn update(&mut self, aperture: f64, now: DateTime<Utc>, config: &AnalysisConfig) -> bool {
        self.cooldown = self.cooldown.saturating_sub(1);

        if aperture <= config.mouth_open_threshold || self.cooldown > 0 {
            self.open_since = None;
            return false;
        }

        let since = *self.open_since.get_or_insert(now);
        if (now - since).num_milliseconds() > config.yawn_min_ms {
            self.cooldown = config.yawn_cooldown_samples();
            self.open_since = None;
            return true;
        }

        false
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    #[test]
    fn yawn_needs_more_than_threshold_duration() {
        let config = AnalysisConfig::default();
        let mut mouth = MouthApertureMachine::new();
        assert!(!mouth.update(0.08, at(0), &config));
        assert!(!mouth.update(0.08, at(400), &config));
        assert!(mouth.update(0.08, at(401), &config));
        assert!(!mouth.is_open());
        assert_eq!(mouth.cooldown(), 90);
    }

    #[test]
    fn a_single_dip_cancels_candidate() {
        let config = AnalysisConfig::default();
        let mut mouth = MouthApertureMachine::new();
        mouth.update(0.08, at(0), &config);
        mouth.update(0.08, at(300), &config);
        mouth.update(0.05, at(350), &config);
        assert!(!mouth.is_open());
        assert!(!mouth.update(0.08, at(500), &config));
        assert!(!mouth.update(0.08, at(850), &config));
        assert!(mouth.update(0.08, at(901), &config));
    }

    #[test]
    fn cooldown_holds_candidate_closed() {
        let config = AnalysisConfig::default();
        let mut mouth = MouthApertureMachine::new();
        mouth.update(0.08, at(0), &config);
        assert!(mouth.update(0.08, at(500), &config));

        for step in 1..90 {
            assert!(!mouth.update(0.08, at(500 + step * 33), &config));
            assert!(!mouth.is_open());
        }
        // cooldown reaches zero on the 90th sample and the candidate restarts
        assert!(!mouth.update(0.08, at(500 + 90 * 33), &config));
        assert!(mouth.is_open());
    }
}
