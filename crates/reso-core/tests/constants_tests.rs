// Host-side tests for constants and their relationships.

use reso_core::constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn link_weights_are_ordered() {
    assert!(LINK_WEIGHT_MIN > 0.0);
    assert!(LINK_WEIGHT_MIN <= DEFAULT_LINK_WEIGHT && DEFAULT_LINK_WEIGHT <= LINK_WEIGHT_MAX);
    assert!(LINK_WEIGHT_MIN <= PROXIMITY_WEIGHT_MIN && PROXIMITY_WEIGHT_MIN <= LINK_WEIGHT_MAX);
    assert!(FALLBACK_WEIGHT > 0.0 && FALLBACK_WEIGHT <= 1.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn physics_constants_are_within_reasonable_bounds() {
    // Friction and restitution are per-frame ratios
    assert!(PLANAR_FRICTION > 0.0 && PLANAR_FRICTION < 1.0);
    assert!(BUBBLE_FRICTION > 0.0 && BUBBLE_FRICTION < 1.0);
    assert!((0.0..=1.0).contains(&PLANAR_RESTITUTION));
    assert!((0.0..=1.0).contains(&BUBBLE_RESTITUTION));
    assert!((0.0..=1.0).contains(&COLLISION_IMPULSE));

    // Step clamp should allow at least one 60 Hz frame
    assert!(MAX_STEP_SEC >= 1.0 / REFERENCE_FPS);

    // Several bubbles must fit side by side in the disk
    assert!(BUBBLE_NODE_RADIUS * 4.0 < BUBBLE_BOUND_RADIUS);
    assert!(PLANAR_NODE_RADIUS * 2.0 < PLANAR_REST_LENGTH);
    assert!(BUBBLE_BASE_SPEED < BUBBLE_MAX_SPEED);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn gesture_timers_are_ordered() {
    // A tap must end before a long press could fire
    assert!(TAP_MAX < LONG_PRESS);
    // Holding a node for delete takes longer than opening the picker
    assert!(LONG_PRESS < DELETE_HOLD);
    assert!(PICK_RADIUS_SCALE >= 1.0);
    assert!(TAP_SLOP_FRACTION < LINK_DISTANCE_FRACTION);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn idle_audio_never_counts_as_a_peak() {
    assert!(IDLE_LEVEL_CENTER - IDLE_LEVEL_SWING >= 0.0);
    assert!(IDLE_LEVEL_CENTER + IDLE_LEVEL_SWING < AUDIO_PEAK_LEVEL);
    assert!(SPECTRUM_LEVEL_FLOOR < AUDIO_PEAK_LEVEL);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn tag_timing_is_consistent() {
    // Tags outlive the rate limit, so several can be on screen at once
    assert!(TAG_TTL_MIN_MS > TAG_RATE_LIMIT.as_millis() as f32);
    assert!(TAG_SWEEP_INTERVAL < TAG_RATE_LIMIT);
    assert!((0.0..=1.0).contains(&TAG_SECOND_WORD_CHANCE));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn loop_length_spans_eighteen_to_fifty_seconds() {
    assert_eq!(LOOP_SECONDS_MIN, 18.0);
    assert_eq!(LOOP_SECONDS_MIN + LOOP_SECONDS_SPAN, 50.0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn uniform_smoothing_rates_are_fractions() {
    for rate in [UNIFORM_SMOOTH_INTENSITY, UNIFORM_SMOOTH_SPREAD, UNIFORM_SMOOTH_NOISE] {
        assert!(rate > 0.0 && rate < 1.0);
    }
    assert!(UNIFORM_TIME_RATE_PLAY > UNIFORM_TIME_RATE_STOP);
}
