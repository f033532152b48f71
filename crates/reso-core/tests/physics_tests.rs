// Host-side tests for the layout integrator.

use glam::{vec2, Vec2};
use reso_core::constants::MAX_STEP_SEC;
use reso_core::*;
use std::time::Duration;

const FRAME: f32 = 1.0 / 60.0;

fn store_for(config: &PhysicsConfig) -> GraphStore {
    GraphStore::new(config.bounds, config.node_radius)
}

/// Free space with no forces, so only damping acts.
fn drift_config() -> PhysicsConfig {
    PhysicsConfig {
        bounds: Bounds::Rect {
            min: Vec2::splat(-100.0),
            max: Vec2::splat(100.0),
        },
        repulsion: 0.0,
        spring: 0.0,
        center_pull: 0.0,
        ..PhysicsConfig::planar()
    }
}

#[test]
fn pinned_node_never_moves() {
    let config = PhysicsConfig::planar();
    let mut store = store_for(&config);
    let anchor = store.add_node("🪨", vec2(0.2, 0.3)).id;
    let other = store.add_node("🔥", vec2(0.7, 0.6)).id;
    store.add_node("🌱", vec2(0.21, 0.31));
    store.toggle_link(anchor, other, 1.0, Duration::ZERO);
    store.set_pinned(anchor, true);
    let start = store.node(anchor).map(|n| n.position);

    let mut engine = PhysicsEngine::new(config);
    engine.settle(&mut store, 200, FRAME);

    assert_eq!(store.node(anchor).map(|n| n.position), start);
    assert_eq!(store.node(anchor).map(|n| n.velocity), Some(Vec2::ZERO));
}

#[test]
fn springs_pull_linked_nodes_together() {
    let config = PhysicsConfig::planar();
    let mut store = store_for(&config);
    let a = store.add_node("🌊", vec2(0.1, 0.5)).id;
    let b = store.add_node("🌙", vec2(0.9, 0.5)).id;
    store.toggle_link(a, b, 1.0, Duration::ZERO);
    let mut engine = PhysicsEngine::new(config);
    engine.settle(&mut store, 120, FRAME);

    let pa = store.node(a).map(|n| n.position).unwrap_or_default();
    let pb = store.node(b).map(|n| n.position).unwrap_or_default();
    assert!(pa.distance(pb) < 0.8, "distance after settling: {}", pa.distance(pb));
}

#[test]
fn bubbles_stay_inside_the_disk() {
    let config = PhysicsConfig::bubble();
    let mut store = store_for(&config);
    for k in 0..8 {
        let angle = k as f32 * 0.8;
        let id = store.add_node("🪐", vec2(angle.cos(), angle.sin()) * 0.5).id;
        if let Some(n) = store.node_mut(id) {
            n.velocity = vec2(angle.sin(), -angle.cos()) * 5.0;
        }
    }
    let mut engine = PhysicsEngine::new(config);
    for step in 0..600 {
        engine.advance(&mut store, FRAME);
        for node in store.nodes() {
            assert!(
                store.bounds().contains(node.position, node.radius),
                "step {step}: {} escaped to {:?}",
                node.id,
                node.position
            );
        }
    }
}

#[test]
fn collisions_separate_overlapping_bubbles() {
    let config = PhysicsConfig::bubble();
    let mut store = store_for(&config);
    let a = store.add_node("🌊", vec2(-0.05, 0.0)).id;
    let b = store.add_node("🔥", vec2(0.05, 0.0)).id;
    let mut engine = PhysicsEngine::new(config.clone());
    engine.advance(&mut store, FRAME);

    let pa = store.node(a).map(|n| n.position).unwrap_or_default();
    let pb = store.node(b).map(|n| n.position).unwrap_or_default();
    let min_distance = 2.0 * config.node_radius;
    assert!(pa.distance(pb) >= min_distance - 1e-4, "still overlapping: {}", pa.distance(pb));
}

#[test]
fn approaching_bubbles_bounce_apart() {
    let config = PhysicsConfig::bubble();
    let mut store = store_for(&config);
    let a = store.add_node("🌊", vec2(-0.115, 0.0)).id;
    let b = store.add_node("🔥", vec2(0.115, 0.0)).id;
    if let Some(n) = store.node_mut(a) {
        n.velocity = vec2(1.0, 0.0);
    }
    if let Some(n) = store.node_mut(b) {
        n.velocity = vec2(-1.0, 0.0);
    }
    let mut engine = PhysicsEngine::new(config);
    engine.advance(&mut store, FRAME);

    let va = store.node(a).map(|n| n.velocity).unwrap_or_default();
    let vb = store.node(b).map(|n| n.velocity).unwrap_or_default();
    let closing = (vb - va).x;
    assert!(closing.abs() < 1.0, "collision impulse should reduce closing speed, got {closing}");
}

#[test]
fn large_steps_are_clamped() {
    let config = drift_config();
    let mut slow = store_for(&config);
    let mut fast = store_for(&config);
    for store in [&mut slow, &mut fast] {
        let id = store.add_node("⚡", Vec2::ZERO).id;
        if let Some(n) = store.node_mut(id) {
            n.velocity = vec2(1.0, 0.0);
        }
    }
    let mut engine = PhysicsEngine::new(config);
    engine.advance(&mut slow, MAX_STEP_SEC);
    engine.advance(&mut fast, 10.0);
    assert_eq!(slow.nodes()[0].position, fast.nodes()[0].position);
}

#[test]
fn non_positive_or_nan_steps_do_nothing() {
    let config = drift_config();
    let mut store = store_for(&config);
    let id = store.add_node("⚡", Vec2::ZERO).id;
    if let Some(n) = store.node_mut(id) {
        n.velocity = vec2(1.0, 0.0);
    }
    let before = store.snapshot();
    let mut engine = PhysicsEngine::new(config);
    engine.advance(&mut store, 0.0);
    engine.advance(&mut store, -1.0);
    engine.advance(&mut store, f32::NAN);
    assert_eq!(store.snapshot(), before);
}

#[test]
fn damping_is_frame_rate_independent() {
    let config = drift_config();
    let mut at_60 = store_for(&config);
    let mut at_30 = store_for(&config);
    for store in [&mut at_60, &mut at_30] {
        let id = store.add_node("🌊", Vec2::ZERO).id;
        if let Some(n) = store.node_mut(id) {
            n.velocity = vec2(1.0, 0.0);
        }
    }
    let mut engine = PhysicsEngine::new(config.clone());
    engine.settle(&mut at_60, 60, 1.0 / 60.0);
    engine.settle(&mut at_30, 30, 1.0 / 30.0);

    let expected = config.friction.powf(60.0);
    let s60 = at_60.nodes()[0].velocity.length();
    let s30 = at_30.nodes()[0].velocity.length();
    assert!((s60 - expected).abs() < 1e-4, "60 Hz speed {s60} vs {expected}");
    assert!((s30 - expected).abs() < 1e-4, "30 Hz speed {s30} vs {expected}");
}

#[test]
fn radial_impulse_falls_off_with_distance() {
    let config = PhysicsConfig::bubble();
    let mut store = store_for(&config);
    let near = store.add_node("🌊", vec2(0.5, 0.0)).id;
    let far = store.add_node("🔥", vec2(0.0, 0.8)).id;
    let pinned = store.add_node("🪨", vec2(-0.3, 0.0)).id;
    store.set_pinned(pinned, true);

    let engine = PhysicsEngine::new(config);
    engine.apply_radial_impulse(&mut store, Vec2::ZERO, 0.7);

    let v_near = store.node(near).map(|n| n.velocity).unwrap_or_default();
    let v_far = store.node(far).map(|n| n.velocity).unwrap_or_default();
    assert!((v_near - vec2(0.35, 0.0)).length() < 1e-5, "near: {v_near:?}");
    assert!((v_far - vec2(0.0, 0.14)).length() < 1e-5, "far: {v_far:?}");
    assert_eq!(store.node(pinned).map(|n| n.velocity), Some(Vec2::ZERO));
}

#[test]
fn kinetic_energy_decays_without_input() {
    let config = PhysicsConfig::bubble();
    let mut store = store_for(&config);
    for k in 0..5 {
        let id = store.add_node("✨", vec2(k as f32 * 0.3 - 0.6, 0.0)).id;
        if let Some(n) = store.node_mut(id) {
            n.velocity = vec2(0.0, 1.0);
        }
    }
    let start = PhysicsEngine::kinetic_energy(&store);
    let mut engine = PhysicsEngine::new(config);
    engine.settle(&mut store, 600, FRAME);
    assert!(PhysicsEngine::kinetic_energy(&store) < start);
}
