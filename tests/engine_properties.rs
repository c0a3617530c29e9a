mod common;

use chrono::Duration;
use common::*;
use drowsewatch_lib::analysis::{AnalysisConfig, BlinkWindow, DrowsinessEngine, DrowsinessLevel};
use drowsewatch_lib::models::{EventKind, Sample};

#[test]
fn sustained_closure_fires_critical_at_2500ms() {
    let mut engine = engine();

    // 0..=2600 ms of closed eyes.
    let fired = drive(&mut engine, 0..79, |_| (CLOSED_EAR, MOUTH_SHUT));

    assert_eq!(fired, vec![(76, EventKind::CriticalMicrosleep)]);
    assert_eq!(frame_time(76, 30) - frame_time(0, 30), Duration::milliseconds(2533));
    assert_eq!(engine.score(), 20);
    assert_eq!(engine.counters().microsleeps, 1);
    assert_eq!(engine.events()[0].probability_snapshot, 20);
}

#[test]
fn continued_closure_fires_again_once_cooldown_allows() {
    let mut engine = engine();

    let fired = drive(&mut engine, 0..200, |_| (CLOSED_EAR, MOUTH_SHUT));

    // The timer restarts at frame 77; the 120-sample cooldown ends at frame 196.
    assert_eq!(kinds_of(&fired, EventKind::CriticalMicrosleep), vec![76, 196]);
    assert_eq!(engine.score(), 40);
}

#[test]
fn short_closure_is_a_blink_without_score_change() {
    let mut engine = engine();

    // Closed for frames 0..=5 (200 ms), reopened at frame 6.
    let fired = drive(&mut engine, 0..10, |frame| {
        if frame < 6 {
            (CLOSED_EAR, MOUTH_SHUT)
        } else {
            (OPEN_EAR, MOUTH_SHUT)
        }
    });

    assert_eq!(fired, vec![(6, EventKind::Blink)]);
    assert_eq!(engine.score(), 0);
    assert!(engine.history().is_empty());
    assert_eq!(engine.counters().blinks, 1);
    assert_eq!(engine.regulator().window().blink_count, 1);
}

#[test]
fn long_closure_is_moderate_microsleep_with_cooldown() {
    let mut engine = engine();

    // 900 ms closed, reopen at 28; a second ~1 s closure while cooling down;
    // a third once the 120 samples after frame 28 have passed.
    let fired = drive(&mut engine, 0..200, |frame| match frame {
        0..=27 => (CLOSED_EAR, MOUTH_SHUT),
        29..=58 => (CLOSED_EAR, MOUTH_SHUT),
        150..=177 => (CLOSED_EAR, MOUTH_SHUT),
        _ => (OPEN_EAR, MOUTH_SHUT),
    });

    assert_eq!(
        fired,
        vec![
            (28, EventKind::ModerateMicrosleep),
            (178, EventKind::ModerateMicrosleep),
        ]
    );
    assert_eq!(engine.score(), 24);
    assert_eq!(engine.history().first().map(|entry| entry.value), Some(12));
}

#[test]
fn held_open_mouth_yawns_once_per_cooldown() {
    let mut engine = engine();

    // Open continuously from frame 0; the cooldown (90 samples) runs to frame 103.
    let fired = drive(&mut engine, 0..104, |_| (OPEN_EAR, MOUTH_WIDE));

    assert_eq!(fired, vec![(13, EventKind::Yawn)]);
    assert_eq!(engine.score(), 6);
    assert_eq!(engine.counters().yawns, 1);
}

#[test]
fn yawn_needs_unbroken_opening() {
    let mut engine = engine();

    let fired = drive(&mut engine, 0..30, |frame| {
        if frame == 10 {
            (OPEN_EAR, MOUTH_SHUT)
        } else {
            (OPEN_EAR, MOUTH_WIDE)
        }
    });

    // Restarts at frame 11; 433 ms later is frame 24.
    assert_eq!(fired, vec![(24, EventKind::Yawn)]);
}

fn blink_train(blinks: i64) -> impl FnMut(i64) -> (f64, f64) {
    move |frame| {
        let slot = frame / 60;
        let phase = frame % 60;
        if slot < blinks && (10..13).contains(&phase) {
            (CLOSED_EAR, MOUTH_SHUT)
        } else {
            (OPEN_EAR, MOUTH_SHUT)
        }
    }
}

#[test]
fn twenty_five_blinks_in_a_window_escalate_once() {
    let mut engine = engine();

    let fired = drive(&mut engine, 0..1800, blink_train(25));

    assert_eq!(kinds_of(&fired, EventKind::Blink).len(), 25);
    assert_eq!(kinds_of(&fired, EventKind::ElevatedBlinks), vec![1799]);
    assert_eq!(engine.score(), 2);
    assert_eq!(engine.regulator().window(), BlinkWindow::default());
}

#[test]
fn twenty_four_blinks_do_not_escalate_and_window_still_resets() {
    let mut engine = engine();

    let fired = drive(&mut engine, 0..1800, blink_train(24));

    assert_eq!(kinds_of(&fired, EventKind::Blink).len(), 24);
    assert!(kinds_of(&fired, EventKind::ElevatedBlinks).is_empty());
    assert_eq!(engine.score(), 0);
    assert_eq!(engine.regulator().window(), BlinkWindow::default());
    // Session counter survives the window reset.
    assert_eq!(engine.counters().blinks, 24);
}

#[test]
fn idle_minute_decays_exactly_once() {
    let mut engine = engine();

    // 60.5 s of open eyes and a shut mouth.
    let fired = drive(&mut engine, 0..1816, |_| (OPEN_EAR, MOUTH_SHUT));

    assert_eq!(fired, vec![(1800, EventKind::IdleDecay)]);
    assert_eq!(engine.score(), 0);
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn sparse_samples_miss_the_idle_window() {
    let mut engine = engine();

    for ms in [0, 59_500, 61_500, 75_000] {
        let sample = Sample::new(
            base_time() + Duration::milliseconds(ms),
            face(OPEN_EAR, MOUTH_SHUT),
        );
        let outcome = engine.process(&sample).unwrap();
        assert!(outcome.events.is_empty(), "unexpected event at {ms} ms");
    }
    assert!(engine.history().is_empty());
}

#[test]
fn score_saturates_at_one_hundred() {
    let mut engine = engine();

    // Six critical microsleeps would be +120 without clamping.
    let fired = drive(&mut engine, 0..790, |_| (CLOSED_EAR, MOUTH_SHUT));

    assert_eq!(kinds_of(&fired, EventKind::CriticalMicrosleep).len(), 6);
    assert_eq!(engine.score(), 100);
    assert!(engine.history().iter().all(|entry| entry.value <= 100));
    assert_eq!(engine.events().last().map(|e| e.probability_snapshot), Some(100));
}

#[test]
fn snapshot_carries_recommendation_for_current_level() {
    let mut engine = engine();
    let calm = engine.snapshot();
    assert_eq!(calm.level, DrowsinessLevel::Low);
    assert_eq!(calm.recommendation, DrowsinessLevel::Low.recommendation());

    drive(&mut engine, 0..790, |_| (CLOSED_EAR, MOUTH_SHUT));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.level, DrowsinessLevel::Critical);
    assert_eq!(snapshot.recommendation, DrowsinessLevel::Critical.recommendation());
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["recommendation"], DrowsinessLevel::Critical.recommendation());
}

#[test]
fn rejected_samples_leave_state_untouched() {
    let mut engine = engine();

    drive(&mut engine, 0..20, |_| (CLOSED_EAR, MOUTH_SHUT));
    let cooldown_before = engine.eye().cooldown();

    let truncated = Sample::new(frame_time(20, 30), face(CLOSED_EAR, MOUTH_SHUT)[..100].to_vec());
    assert!(engine.process(&truncated).is_err());

    let mut degenerate = face(CLOSED_EAR, MOUTH_SHUT);
    degenerate[133] = degenerate[33];
    assert!(engine.process(&Sample::new(frame_time(21, 30), degenerate)).is_err());

    assert_eq!(engine.eye().cooldown(), cooldown_before);
    assert_eq!(engine.regulator().window().frame_count, 20);
    assert!(engine.events().is_empty());
}

#[test]
fn reset_returns_engine_to_initial_state() {
    let mut engine = engine();
    drive(&mut engine, 0..100, |_| (CLOSED_EAR, MOUTH_WIDE));
    assert!(engine.score() > 0);

    engine.reset();

    assert_eq!(engine.score(), 0);
    assert!(engine.events().is_empty());
    assert!(engine.history().is_empty());
    assert_eq!(engine.counters(), Default::default());
    assert_eq!(engine.regulator().window(), BlinkWindow::default());
    assert_eq!(engine.regulator().last_event_at(), None);
    assert_eq!(engine.session_id(), None);
}

#[test]
fn huge_sample_rate_does_not_overflow() {
    let config = AnalysisConfig::with_samples_per_second(100_000_000);
    let mut engine = DrowsinessEngine::new(config);

    let fired = drive(&mut engine, 0..100, |_| (CLOSED_EAR, MOUTH_WIDE));

    assert_eq!(kinds_of(&fired, EventKind::CriticalMicrosleep), vec![76]);
    assert_eq!(kinds_of(&fired, EventKind::Yawn), vec![13]);
    assert_eq!(engine.eye().cooldown(), 400_000_000 - 23);
}
