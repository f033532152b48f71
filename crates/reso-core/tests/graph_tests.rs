// Host-side tests for the graph store.

use glam::vec2;
use reso_core::*;
use std::time::Duration;

fn planar_store() -> GraphStore {
    GraphStore::new(Bounds::unit_square(), 0.03)
}

#[test]
fn toggle_link_creates_then_removes_for_either_order() {
    let mut store = planar_store();
    let a = store.add_node("🌊", vec2(0.2, 0.2)).id;
    let b = store.add_node("🔥", vec2(0.8, 0.8)).id;

    let created = store.toggle_link(a, b, 0.6, Duration::ZERO);
    assert!(matches!(created, LinkToggle::Created(_)));
    assert_eq!(store.links().len(), 1);
    assert!(store.link_between(b, a).is_some(), "links are undirected");

    let removed = store.toggle_link(b, a, 0.6, Duration::from_secs(1));
    assert!(matches!(removed, LinkToggle::Removed(_)));
    assert!(store.links().is_empty());
}

#[test]
fn toggle_link_ignores_self_loops_and_missing_nodes() {
    let mut store = planar_store();
    let a = store.add_node("🌊", vec2(0.5, 0.5)).id;
    assert_eq!(store.toggle_link(a, a, 0.5, Duration::ZERO), LinkToggle::Ignored);
    assert_eq!(store.toggle_link(a, NodeId(99), 0.5, Duration::ZERO), LinkToggle::Ignored);
    assert!(store.links().is_empty());
}

#[test]
fn link_weight_is_clamped() {
    let mut store = planar_store();
    let a = store.add_node("🌊", vec2(0.2, 0.5)).id;
    let b = store.add_node("🌱", vec2(0.8, 0.5)).id;
    store.toggle_link(a, b, 7.0, Duration::ZERO);
    let w = store.link_between(a, b).map(|l| l.weight);
    assert_eq!(w, Some(1.0));
}

#[test]
fn remove_node_cascades_to_links() {
    let mut store = planar_store();
    let a = store.add_node("🌊", vec2(0.2, 0.2)).id;
    let b = store.add_node("🔥", vec2(0.5, 0.5)).id;
    let c = store.add_node("🌙", vec2(0.8, 0.8)).id;
    store.toggle_link(a, b, 0.6, Duration::ZERO);
    store.toggle_link(b, c, 0.6, Duration::ZERO);
    store.toggle_link(a, c, 0.6, Duration::ZERO);

    assert!(store.remove_node(b));
    assert_eq!(store.nodes().len(), 2);
    assert_eq!(store.links().len(), 1);
    assert!(store.links().iter().all(|l| !l.touches(b)));
    assert!(!store.remove_node(b), "second removal is a no-op");
}

#[test]
fn unknown_symbol_falls_back_to_fluid() {
    let (kind, weight) = classify_symbol("🦀");
    assert_eq!(kind, NodeKind::Fluid);
    assert!((weight - 0.8).abs() < 1e-6);

    let (kind, weight) = classify_symbol("🔥");
    assert_eq!(kind, NodeKind::Kinetic);
    assert!((weight - 1.0).abs() < 1e-6);
}

#[test]
fn variation_selector_does_not_change_classification() {
    assert_eq!(classify_symbol("🌫"), classify_symbol("🌫️"));
    assert_eq!(classify_symbol("🌫").0, NodeKind::Mist);
}

#[test]
fn every_library_symbol_classifies_to_its_own_kind() {
    for entry in EMOJI_LIBRARY.iter() {
        assert_eq!(classify_symbol(entry.symbol), (entry.kind, entry.weight), "{}", entry.symbol);
    }
}

#[test]
fn add_node_clamps_into_bounds() {
    let mut store = planar_store();
    let p = store.add_node("🌊", vec2(-3.0, 4.0)).position;
    assert!(Bounds::unit_square().contains(p, 0.03), "clamped to {p:?}");

    let mut disk = GraphStore::new(Bounds::disk(1.0), 0.12);
    let p = disk.add_node("🪐", vec2(5.0, 0.0)).position;
    assert!((p.length() - 0.88).abs() < 1e-4, "disk clamp to rim minus radius, got {p:?}");
}

#[test]
fn find_node_near_prefers_closest_then_earliest() {
    let mut store = planar_store();
    let a = store.add_node("🌊", vec2(0.25, 0.5)).id;
    let b = store.add_node("🔥", vec2(0.75, 0.5)).id;

    let hit = store.find_node_near(vec2(0.3, 0.5), 0.3).map(|n| n.id);
    assert_eq!(hit, Some(a));
    let hit = store.find_node_near(vec2(0.7, 0.5), 0.3).map(|n| n.id);
    assert_eq!(hit, Some(b));
    let tie = store.find_node_near(vec2(0.5, 0.5), 0.3).map(|n| n.id);
    assert_eq!(tie, Some(a), "equidistant points resolve to the earlier node");
    assert!(store.find_node_near(vec2(0.5, 0.9), 0.05).is_none());
}

#[test]
fn set_pinned_zeroes_velocity() {
    let mut store = planar_store();
    let a = store.add_node("🌊", vec2(0.5, 0.5)).id;
    if let Some(n) = store.node_mut(a) {
        n.velocity = vec2(1.0, 1.0);
    }
    assert!(store.set_pinned(a, true));
    let node = store.node(a).cloned();
    assert!(node.as_ref().is_some_and(|n| n.pinned && n.velocity == glam::Vec2::ZERO));
}

#[test]
fn restore_reassigns_ids_and_drops_dangling_links() {
    let mut store = planar_store();
    let a = store.add_node("🌊", vec2(0.2, 0.2)).id;
    let b = store.add_node("🔥", vec2(0.8, 0.8)).id;
    store.toggle_link(a, b, 0.5, Duration::ZERO);
    let mut snapshot = store.snapshot();
    snapshot.links.push(Link {
        id: LinkId(50),
        source: a,
        target: NodeId(404),
        weight: 0.5,
        created_at: Duration::ZERO,
    });

    let mut other = planar_store();
    other.add_node("🌙", vec2(0.5, 0.5));
    other.restore(&snapshot);
    assert_eq!(other.nodes().len(), 2);
    assert_eq!(other.links().len(), 1);
    let symbols: Vec<&str> = other.nodes().iter().map(|n| n.symbol.as_str()).collect();
    assert_eq!(symbols, ["🌊", "🔥"]);
}

#[test]
fn restore_uses_the_store_body_radius() {
    let snapshot = GraphSnapshot {
        nodes: vec![Node::detached(NodeId(0), "🪐", vec2(0.99, 0.5), glam::Vec2::ZERO, 0.12)],
        links: Vec::new(),
    };
    let mut store = planar_store();
    store.restore(&snapshot);
    let node = &store.nodes()[0];
    assert_eq!(node.radius, 0.03);
    assert!(
        store.bounds().contains(node.position, node.radius),
        "restored node outside bounds: {:?}",
        node.position
    );
}
