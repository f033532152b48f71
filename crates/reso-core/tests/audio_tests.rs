// Host-side tests for the audio level input and peak detection.

use reso_core::*;
use std::cell::Cell;
use std::rc::Rc;
use std::ops::RangeInclusive;
use std::time::Duration;

// [0.1, 0.6] with room for f32 rounding at the extremes.
const IDLE_RANGE: RangeInclusive<f32> = 0.099_999..=0.600_001;

/// Fixed-level source that records whether it was released.
struct Fixed {
    level: f32,
    released: Rc<Cell<bool>>,
}

impl LevelSource for Fixed {
    fn level(&mut self, _elapsed: Duration) -> f32 {
        self.level
    }

    fn release(&mut self) {
        self.released.set(true);
    }
}

fn fixed(level: f32) -> (Box<dyn LevelSource>, Rc<Cell<bool>>) {
    let released = Rc::new(Cell::new(false));
    (
        Box::new(Fixed {
            level,
            released: released.clone(),
        }),
        released,
    )
}

#[test]
fn idle_level_stays_in_range_after_capture_fails() {
    let mut audio = AudioInput::default();
    assert!(audio.request());
    audio.fail("permission denied");
    assert_eq!(audio.status(), AudioStatus::Failed);
    for tick in 0..2000u64 {
        let level = audio.sample(Duration::from_millis(tick * 16));
        assert!(IDLE_RANGE.contains(&level), "tick {tick}: level {level}");
    }
}

#[test]
fn idle_level_moves_over_time() {
    let idle = IdleOscillator::default();
    let a = idle.sample(Duration::ZERO);
    let b = idle.sample(Duration::from_secs(1));
    assert!((a - b).abs() > 0.01);
}

#[test]
fn live_source_replaces_idle_level() {
    let mut audio = AudioInput::default();
    audio.request();
    let (source, _) = fixed(0.9);
    assert!(audio.resolve(source));
    assert_eq!(audio.status(), AudioStatus::Live);
    assert_eq!(audio.sample(Duration::from_secs(3)), 0.9);
}

#[test]
fn non_finite_live_levels_fall_back_to_idle() {
    let mut audio = AudioInput::default();
    audio.request();
    let (source, _) = fixed(f32::NAN);
    audio.resolve(source);
    let level = audio.sample(Duration::from_secs(2));
    assert!(IDLE_RANGE.contains(&level), "{level}");
}

#[test]
fn late_capture_after_release_is_dropped() {
    let mut audio = AudioInput::default();
    assert!(audio.request());
    assert!(!audio.request(), "one request at a time");
    audio.release();
    assert_eq!(audio.status(), AudioStatus::Off);

    let (source, released) = fixed(0.5);
    assert!(!audio.resolve(source));
    assert!(released.get(), "late source must be released immediately");
    assert_eq!(audio.status(), AudioStatus::Off);
}

#[test]
fn release_stops_a_live_source_and_is_repeatable() {
    let mut audio = AudioInput::default();
    audio.release();
    audio.request();
    let (source, released) = fixed(0.5);
    audio.resolve(source);
    audio.release();
    audio.release();
    assert!(released.get());
    assert_eq!(audio.status(), AudioStatus::Off);
}

#[test]
fn failure_without_a_request_is_ignored() {
    let mut audio = AudioInput::default();
    audio.fail("no device");
    assert_eq!(audio.status(), AudioStatus::Off);
    assert!(audio.request(), "a failed or idle input can be asked again");
}

#[test]
fn spectrum_level_maps_mean_bin_to_unit_range() {
    assert_eq!(spectrum_level(&[]), 0.05);
    assert_eq!(spectrum_level(&[0; 128]), 0.05);
    assert!((spectrum_level(&[100; 128]) - 0.5).abs() < 1e-6);
    assert_eq!(spectrum_level(&[255; 128]), 1.0);
}

#[test]
fn peaks_respect_threshold_and_cooldown() {
    let mut peaks = PeakDetector::default();
    let ms = Duration::from_millis;
    assert!(!peaks.update(0.5, ms(0)));
    assert!(peaks.update(0.9, ms(100)));
    assert!(!peaks.update(0.95, ms(500)));
    assert!(peaks.update(0.8, ms(1400)));
}
