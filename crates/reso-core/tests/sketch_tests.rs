// Host-side tests for the frame scheduler.

use glam::vec2;
use reso_core::*;
use std::time::Duration;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

struct Fixed(f32);

impl LevelSource for Fixed {
    fn level(&mut self, _elapsed: Duration) -> f32 {
        self.0
    }
}

#[test]
fn new_sketch_seeds_one_node_at_the_centre() {
    let planar = Sketch::new(SketchConfig::planar(), 1);
    assert_eq!(planar.store().nodes().len(), 1);
    assert_eq!(planar.store().nodes()[0].symbol, "🌊");
    assert_eq!(planar.store().nodes()[0].position, vec2(0.5, 0.5));

    let bubble = Sketch::new(SketchConfig::bubble(), 1);
    assert_eq!(bubble.store().nodes()[0].position, vec2(0.0, 0.0));
}

#[test]
fn frames_keep_running_after_audio_failure() {
    let mut sketch = Sketch::new(SketchConfig::planar(), 3);
    assert!(sketch.set_mode(Mode::Play), "entering play asks for audio");
    sketch.audio_failed("NotAllowedError");
    assert_eq!(sketch.audio_status(), AudioStatus::Failed);

    for tick in 0..300u64 {
        let level = sketch.frame_at(ms(tick * 16)).map(|view| view.level);
        let level = level.unwrap_or(-1.0);
        assert!((0.099..=0.601).contains(&level), "tick {tick}: level {level}");
    }
    assert_eq!(sketch.frames(), 300);
}

#[test]
fn teardown_is_idempotent_and_stops_frames() {
    let mut sketch = Sketch::new(SketchConfig::bubble(), 3);
    assert!(sketch.frame_at(ms(0)).is_some());
    sketch.set_mode(Mode::Play);
    sketch.teardown();
    sketch.teardown();
    assert!(!sketch.is_running());
    assert_eq!(sketch.audio_status(), AudioStatus::Off);
    assert!(sketch.frame_at(ms(16)).is_none());
    assert!(sketch.pointer_down(1, vec2(0.0, 0.0), ms(20)).is_empty());

    // capture resolving after teardown is released, not used
    assert!(!sketch.audio_ready(Box::new(Fixed(0.9))));
}

#[test]
fn live_audio_level_reaches_the_frame() {
    let mut sketch = Sketch::new(SketchConfig::planar(), 3);
    sketch.set_mode(Mode::Play);
    assert!(sketch.audio_ready(Box::new(Fixed(0.3))));
    let level = sketch.frame_at(ms(0)).map(|v| v.level);
    assert_eq!(level, Some(0.3));

    sketch.set_mode(Mode::Stop);
    assert_eq!(sketch.audio_status(), AudioStatus::Off);
}

#[test]
fn loud_audio_emits_a_tag() {
    let mut sketch = Sketch::new(SketchConfig::planar(), 3);
    sketch.set_mode(Mode::Play);
    sketch.audio_ready(Box::new(Fixed(0.95)));
    let tags = sketch.frame_at(ms(0)).map(|v| v.tags.len());
    assert_eq!(tags, Some(1));
}

#[test]
fn tap_in_bubble_mode_pushes_nodes_away() {
    let mut sketch = Sketch::new(SketchConfig::bubble(), 3);
    sketch.frame_at(ms(0));
    let tap_at = vec2(0.5, 0.0);
    sketch.pointer_down(1, tap_at, ms(10));
    let events = sketch.pointer_up(1, tap_at, ms(60));
    assert!(matches!(events.as_slice(), [InteractionEvent::Impulse { .. }]));
    let velocity = sketch.store().nodes()[0].velocity;
    assert!(velocity.x < -0.1, "seed should be pushed left, got {velocity:?}");
}

#[test]
fn adding_symbols_emits_a_tag_and_recomputes_metrics() {
    let mut sketch = Sketch::new(SketchConfig::planar(), 3);
    let ids = sketch.add_symbols(&["🔥".to_owned(), "🌱".to_owned()], vec2(0.3, 0.3), ms(5));
    assert_eq!(ids.len(), 2);
    assert_eq!(sketch.store().nodes().len(), 3);
    assert_eq!(sketch.tags().len(), 1);

    let before = sketch.params().rhythm;
    sketch.connect(ids[0], ids[1], ms(900));
    let after = sketch.frame_at(ms(1000)).map(|v| v.params.rhythm).unwrap_or_default();
    assert!(after > before, "rhythm {before} -> {after}");
}

#[test]
fn added_bubbles_start_drifting() {
    let mut sketch = Sketch::new(SketchConfig::bubble(), 3);
    let ids = sketch.add_symbols(&["🪐".to_owned()], vec2(0.4, 0.0), ms(0));
    let speed = ids
        .first()
        .and_then(|&id| sketch.store().node(id))
        .map(|n| n.velocity.length())
        .unwrap_or_default();
    assert!(speed > 0.0);
}

#[test]
fn play_mode_disables_node_editing() {
    let mut sketch = Sketch::new(SketchConfig::planar(), 3);
    sketch.set_mode(Mode::Play);
    sketch.pointer_down(1, vec2(0.5, 0.5), ms(0));
    assert!(!sketch.store().nodes()[0].pinned);
    assert!(!sketch.set_mode(Mode::Play), "no second capture request");
}

#[test]
fn picker_flow_through_the_sketch() {
    let mut sketch = Sketch::new(SketchConfig::planar(), 3);
    sketch.pointer_down(1, vec2(0.2, 0.8), ms(0));
    sketch.pointer_up(1, vec2(0.2, 0.8), ms(50));
    assert!(sketch.controller().picker().is_some());

    sketch.toggle_picker_symbol("🌙");
    let events = sketch.commit_picker(ms(100));
    assert!(events.iter().any(|e| matches!(e, InteractionEvent::NodesAdded(ids) if ids.len() == 1)));
    assert_eq!(sketch.store().nodes().len(), 2);
    assert!(sketch.view().picker.is_none());
}

#[test]
fn save_and_load_round_trip() {
    let mut sketch = Sketch::new(SketchConfig::planar(), 3);
    let ids = sketch.add_symbols(&["🔥".to_owned(), "🧵".to_owned()], vec2(0.3, 0.6), ms(0));
    sketch.connect(ids[0], ids[1], ms(0));
    let mut saved = ConstellationStore::new(MemoryBlobStore::default());
    let summary = sketch.save(&mut saved, 1234);
    assert_eq!(summary.as_ref().map(|s| s.count), Some(3));

    let mut other = Sketch::new(SketchConfig::planar(), 9);
    let id = summary.map(|s| s.id).unwrap_or_default();
    assert!(other.load(&saved, &id));
    assert_eq!(other.store().nodes().len(), 3);
    assert_eq!(other.store().links().len(), 1);
    assert!(!other.load(&saved, "missing"));
    assert_eq!(other.store().nodes().len(), 3);
}

#[test]
fn backdrop_time_runs_faster_in_play() {
    let mut stop = Sketch::new(SketchConfig::planar(), 3);
    let mut play = Sketch::new(SketchConfig::planar(), 3);
    play.set_mode(Mode::Play);
    for tick in 0..60u64 {
        stop.frame_at(ms(tick * 16));
        play.frame_at(ms(tick * 16));
    }
    assert!(play.uniforms().time > stop.uniforms().time);
}
