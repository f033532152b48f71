//! Per-frame integrator for the constellation layout.
//!
//! One model covers both layouts: the planar preset runs repulsion, springs
//! and a soft pull toward the centre of a rectangle; the bubble preset keeps
//! springs but swaps repulsion for hard pairwise collisions inside a disk
//! with restitution. Pinned nodes are driven from outside and skip every
//! force.

use crate::constants::*;
use crate::graph::{Bounds, GraphStore, Node};
use fnv::FnvHashMap;
use glam::{vec2, Vec2};

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub bounds: Bounds,
    pub node_radius: f32,
    pub repulsion: f32,
    pub repulsion_softening: f32,
    pub spring: f32,
    pub rest_length: f32,
    pub center_pull: f32,
    /// Velocity retained per 60 Hz frame.
    pub friction: f32,
    pub restitution: f32,
    pub collisions: bool,
    pub max_speed: f32,
}

impl PhysicsConfig {
    pub fn planar() -> Self {
        Self {
            bounds: Bounds::unit_square(),
            node_radius: PLANAR_NODE_RADIUS,
            repulsion: PLANAR_REPULSION,
            repulsion_softening: PLANAR_REPULSION_SOFTENING,
            spring: PLANAR_SPRING,
            rest_length: PLANAR_REST_LENGTH,
            center_pull: PLANAR_CENTER_PULL,
            friction: PLANAR_FRICTION,
            restitution: PLANAR_RESTITUTION,
            collisions: false,
            max_speed: PLANAR_MAX_SPEED,
        }
    }

    pub fn bubble() -> Self {
        Self {
            bounds: Bounds::disk(BUBBLE_BOUND_RADIUS),
            node_radius: BUBBLE_NODE_RADIUS,
            repulsion: 0.0,
            repulsion_softening: PLANAR_REPULSION_SOFTENING,
            spring: BUBBLE_SPRING,
            rest_length: BUBBLE_REST_LENGTH,
            center_pull: 0.0,
            friction: BUBBLE_FRICTION,
            restitution: BUBBLE_RESTITUTION,
            collisions: true,
            max_speed: BUBBLE_MAX_SPEED,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::planar()
    }
}

pub struct PhysicsEngine {
    pub config: PhysicsConfig,
    forces: Vec<Vec2>,
    index: FnvHashMap<crate::graph::NodeId, usize>,
}

impl PhysicsEngine {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            forces: Vec::new(),
            index: FnvHashMap::default(),
        }
    }

    /// Advance the layout by `dt_sec` seconds (clamped to `MAX_STEP_SEC`).
    ///
    /// Order: forces and integration with a first containment pass, then
    /// pairwise collisions, then a second containment pass because separating
    /// a pair can push one of them back across the boundary.
    pub fn advance(&mut self, store: &mut GraphStore, dt_sec: f32) {
        if !(dt_sec > 0.0) {
            return;
        }
        let dt = dt_sec.min(MAX_STEP_SEC);
        self.accumulate_forces(store);

        let bounds = store.bounds();
        let damping = self.config.friction.powf(dt * REFERENCE_FPS);
        let max_speed = self.config.max_speed;
        let restitution = self.config.restitution;
        for (node, force) in store.nodes_mut().iter_mut().zip(&self.forces) {
            if node.pinned {
                node.velocity = Vec2::ZERO;
                continue;
            }
            let mut velocity = (node.velocity + *force * dt) * damping;
            let speed = velocity.length();
            if speed > max_speed {
                velocity *= max_speed / speed;
            }
            node.velocity = velocity;
            node.position += velocity * dt;
            contain(node, bounds, restitution);
        }

        if self.config.collisions {
            resolve_collisions(store.nodes_mut());
            for node in store.nodes_mut().iter_mut().filter(|n| !n.pinned) {
                contain(node, bounds, restitution);
            }
        }
    }

    /// Run `steps` fixed steps, used to relax a graph right after an edit.
    pub fn settle(&mut self, store: &mut GraphStore, steps: usize, dt_sec: f32) {
        for _ in 0..steps {
            self.advance(store, dt_sec);
        }
    }

    /// Push every free node away from `point`, falling off linearly to zero
    /// at the boundary radius.
    pub fn apply_radial_impulse(&self, store: &mut GraphStore, point: Vec2, max_strength: f32) {
        let radius = store.bounds().radius();
        if radius <= 0.0 {
            return;
        }
        for (i, node) in store.nodes_mut().iter_mut().enumerate() {
            if node.pinned {
                continue;
            }
            let delta = node.position - point;
            let distance = delta.length();
            let strength = ((radius - distance) / radius).max(0.0);
            if strength <= 0.0 {
                continue;
            }
            let direction = if distance > DISTANCE_EPSILON {
                delta / distance
            } else {
                fallback_direction(i, 0)
            };
            node.velocity += direction * strength * max_strength;
        }
    }

    pub fn kinetic_energy(store: &GraphStore) -> f32 {
        store
            .nodes()
            .iter()
            .map(|n| 0.5 * n.velocity.length_squared())
            .sum()
    }

    fn accumulate_forces(&mut self, store: &GraphStore) {
        let nodes = store.nodes();
        let count = nodes.len();
        self.forces.clear();
        self.forces.resize(count, Vec2::ZERO);
        self.index.clear();
        for (i, node) in nodes.iter().enumerate() {
            self.index.insert(node.id, i);
        }

        let cfg = &self.config;
        if cfg.repulsion > 0.0 {
            for i in 0..count {
                if nodes[i].pinned {
                    continue;
                }
                for j in (i + 1)..count {
                    if nodes[j].pinned {
                        continue;
                    }
                    let delta = nodes[i].position - nodes[j].position;
                    let distance_sq = delta.length_squared();
                    let distance = distance_sq.sqrt();
                    let direction = if distance > DISTANCE_EPSILON {
                        delta / distance
                    } else {
                        fallback_direction(i, j)
                    };
                    let push = direction
                        * (cfg.repulsion / (distance_sq + cfg.repulsion_softening + DISTANCE_EPSILON));
                    self.forces[i] += push;
                    self.forces[j] -= push;
                }
            }
        }

        if cfg.spring > 0.0 {
            for link in store.links() {
                let (Some(&a), Some(&b)) = (self.index.get(&link.source), self.index.get(&link.target))
                else {
                    continue;
                };
                let delta = nodes[b].position - nodes[a].position;
                let distance = delta.length();
                if distance <= DISTANCE_EPSILON {
                    continue;
                }
                let direction = delta / distance;
                let pull = direction * ((distance - cfg.rest_length) * cfg.spring * link.weight);
                self.forces[a] += pull;
                self.forces[b] -= pull;
            }
        }

        if cfg.center_pull > 0.0 {
            let center = store.bounds().center();
            for (force, node) in self.forces.iter_mut().zip(nodes) {
                *force += (center - node.position) * cfg.center_pull;
            }
        }
    }
}

/// Keep a node inside the bounds. Rectangle walls and the disk rim reflect
/// the outward normal velocity: `v -= (1 + e)(v·n)n`.
fn contain(node: &mut Node, bounds: Bounds, restitution: f32) {
    match bounds {
        Bounds::Rect { min, max } => {
            let inset = Vec2::splat(node.radius).min((max - min) * 0.5);
            let lo = min + inset;
            let hi = max - inset;
            for axis in 0..2 {
                if node.position[axis] < lo[axis] {
                    node.position[axis] = lo[axis];
                    if node.velocity[axis] < 0.0 {
                        node.velocity[axis] *= -restitution;
                    }
                } else if node.position[axis] > hi[axis] {
                    node.position[axis] = hi[axis];
                    if node.velocity[axis] > 0.0 {
                        node.velocity[axis] *= -restitution;
                    }
                }
            }
        }
        Bounds::Disk { center, radius } => {
            let offset = node.position - center;
            let distance = offset.length();
            let limit = (radius - node.radius).max(0.0);
            if distance > limit && distance > 0.0 {
                let normal = offset / distance;
                node.position = center + normal * limit;
                let outward = node.velocity.dot(normal);
                if outward > 0.0 {
                    node.velocity -= normal * ((1.0 + restitution) * outward);
                }
            }
        }
    }
}

/// Separate overlapping free bodies symmetrically and exchange a fraction of
/// their closing speed along the contact normal.
fn resolve_collisions(nodes: &mut [Node]) {
    let count = nodes.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let (head, tail) = nodes.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];
            if a.pinned || b.pinned {
                continue;
            }
            let delta = b.position - a.position;
            let distance = delta.length();
            let min_distance = a.radius + b.radius;
            if distance >= min_distance {
                continue;
            }
            let normal = if distance > DISTANCE_EPSILON {
                delta / distance
            } else {
                fallback_direction(i, j)
            };
            let overlap = (min_distance - distance) * 0.5;
            a.position -= normal * overlap;
            b.position += normal * overlap;

            let closing = (b.velocity - a.velocity).dot(normal);
            if closing < 0.0 {
                let impulse = -closing * COLLISION_IMPULSE;
                a.velocity -= normal * impulse;
                b.velocity += normal * impulse;
            }
        }
    }
}

/// Deterministic unit vector for coincident pairs.
fn fallback_direction(i: usize, j: usize) -> Vec2 {
    let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214 + 0.37) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}
