/// Landmark positions the detector guarantees for one face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkIndices {
    /// Six points per eye: corners at 0 and 3, vertical pairs (1,5) and (2,4).
    pub left_eye: [usize; 6],
    pub right_eye: [usize; 6],
    /// Upper and lower inner lip.
    pub mouth: [usize; 2],
}

impl LandmarkIndices {
    /// Smallest landmark count a sample must carry.
    pub fn required_len(&self) -> usize {
        self.left_eye
            .iter()
            .chain(self.right_eye.iter())
            .chain(self.mouth.iter())
            .copied()
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl Default for LandmarkIndices {
    fn default() -> Self {
        Self {
            left_eye: [33, 160, 158, 133, 153, 144],
            right_eye: [362, 385, 387, 263, 373, 380],
            mouth: [13, 14],
        }
    }
}

/// Tunable thresholds for the per-sample analysis.
///
/// Cooldowns and the blink window are expressed in samples, derived from
/// `samples_per_second`, so their wall-clock length follows the capture rate.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub samples_per_second: u32,
    pub landmarks: LandmarkIndices,

    /// Average EAR below this counts as closed.
    pub ear_closed_threshold: f64,
    /// Closures shorter than this are blinks.
    pub blink_max_ms: i64,
    /// Closures at least this long are moderate microsleeps on reopen.
    pub moderate_microsleep_min_ms: i64,
    /// Continuous closure beyond this is a critical microsleep.
    pub critical_microsleep_ms: i64,
    pub microsleep_cooldown_secs: u32,

    /// Lip distance above this counts as open.
    pub mouth_open_threshold: f64,
    /// Open mouth beyond this is a yawn.
    pub yawn_min_ms: i64,
    pub yawn_cooldown_secs: u32,

    pub critical_microsleep_delta: u32,
    pub moderate_microsleep_delta: u32,
    pub yawn_delta: u32,
    pub elevated_blinks_delta: u32,
    pub idle_decay_delta: u32,

    /// Blinks per window that trigger escalation.
    pub elevated_blink_count: u32,
    /// Idle decay fires when time since the last event falls in `[start, end)`.
    pub idle_window_start_ms: i64,
    pub idle_window_end_ms: i64,
}

impl AnalysisConfig {
    pub fn with_samples_per_second(samples_per_second: u32) -> Self {
        Self {
            samples_per_second,
            ..Self::default()
        }
    }

    pub fn microsleep_cooldown_samples(&self) -> u32 {
        self.microsleep_cooldown_secs.saturating_mul(self.samples_per_second)
    }

    pub fn yawn_cooldown_samples(&self) -> u32 {
        self.yawn_cooldown_secs.saturating_mul(self.samples_per_second)
    }

    pub fn samples_per_minute(&self) -> u32 {
        self.samples_per_second.saturating_mul(60)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            samples_per_second: 30,
            landmarks: LandmarkIndices::default(),
            ear_closed_threshold: 0.21,
            blink_max_ms: 300,
            moderate_microsleep_min_ms: 800,
            critical_microsleep_ms: 2500,
            microsleep_cooldown_secs: 4,
            mouth_open_threshold: 0.05,
            yawn_min_ms: 400,
            yawn_cooldown_secs: 3,
            critical_microsleep_delta: 20,
            moderate_microsleep_delta: 12,
            yawn_delta: 6,
            elevated_blinks_delta: 2,
            idle_decay_delta: 4,
            elevated_blink_count: 25,
            idle_window_start_ms: 60_000,
            idle_window_end_ms: 61_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_sample_counts_follow_rate() {
        let config = AnalysisConfig::default();
        assert_eq!(config.microsleep_cooldown_samples(), 120);
        assert_eq!(config.yawn_cooldown_samples(), 90);
        assert_eq!(config.samples_per_minute(), 1800);

        let slow = AnalysisConfig::with_samples_per_second(10);
        assert_eq!(slow.microsleep_cooldown_samples(), 40);
        assert_eq!(slow.samples_per_minute(), 600);
    }

    #[test]
    fn derived_counts_saturate_on_huge_rates() {
        let config = AnalysisConfig::with_samples_per_second(u32::MAX / 2);
        assert_eq!(config.microsleep_cooldown_samples(), u32::MAX);
        assert_eq!(config.yawn_cooldown_samples(), u32::MAX);
        assert_eq!(config.samples_per_minute(), u32::MAX);
    }

    #[test]
    fn required_len_covers_highest_index() {
        assert_eq!(LandmarkIndices::default().required_len(), 388);
    }
}
