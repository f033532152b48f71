//! Node-link graph model.
//!
//! [`GraphStore`] is the single owner of nodes and links. Physics and the
//! interaction controller mutate positions, velocities and pin flags in place
//! through it, but only the store creates or destroys identities.

use crate::constants::{FALLBACK_WEIGHT, LINK_WEIGHT_MAX, LINK_WEIGHT_MIN};
use glam::Vec2;
use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Fluid,
    Mist,
    Kinetic,
    Pulse,
    Organic,
    Mineral,
    Orbit,
    Vector,
    Reflective,
    Thread,
    Nocturne,
    Spark,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Fluid,
        NodeKind::Mist,
        NodeKind::Kinetic,
        NodeKind::Pulse,
        NodeKind::Organic,
        NodeKind::Mineral,
        NodeKind::Orbit,
        NodeKind::Vector,
        NodeKind::Reflective,
        NodeKind::Thread,
        NodeKind::Nocturne,
        NodeKind::Spark,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EmojiEntry {
    pub symbol: &'static str,
    pub kind: NodeKind,
    pub weight: f32,
}

pub const EMOJI_LIBRARY: [EmojiEntry; 12] = [
    EmojiEntry { symbol: "🌊", kind: NodeKind::Fluid, weight: 0.9 },
    EmojiEntry { symbol: "🌫️", kind: NodeKind::Mist, weight: 0.7 },
    EmojiEntry { symbol: "🔥", kind: NodeKind::Kinetic, weight: 1.0 },
    EmojiEntry { symbol: "⚡", kind: NodeKind::Pulse, weight: 1.0 },
    EmojiEntry { symbol: "🌱", kind: NodeKind::Organic, weight: 0.8 },
    EmojiEntry { symbol: "🪨", kind: NodeKind::Mineral, weight: 0.6 },
    EmojiEntry { symbol: "🪐", kind: NodeKind::Orbit, weight: 0.85 },
    EmojiEntry { symbol: "🧭", kind: NodeKind::Vector, weight: 0.75 },
    EmojiEntry { symbol: "🪞", kind: NodeKind::Reflective, weight: 0.7 },
    EmojiEntry { symbol: "🧵", kind: NodeKind::Thread, weight: 0.65 },
    EmojiEntry { symbol: "🌙", kind: NodeKind::Nocturne, weight: 0.6 },
    EmojiEntry { symbol: "✨", kind: NodeKind::Spark, weight: 0.95 },
];

/// Look up kind and weight for a symbol. Unknown symbols map to
/// `(Fluid, FALLBACK_WEIGHT)`. A trailing U+FE0F variation selector is ignored
/// on either side so "🌫" and "🌫️" resolve the same way.
pub fn classify_symbol(symbol: &str) -> (NodeKind, f32) {
    let bare = symbol.trim_end_matches('\u{FE0F}');
    EMOJI_LIBRARY
        .iter()
        .find(|e| e.symbol == symbol || e.symbol.trim_end_matches('\u{FE0F}') == bare)
        .map(|e| (e.kind, e.weight))
        .unwrap_or((NodeKind::Fluid, FALLBACK_WEIGHT))
}

/// Layout boundary shared by the store (position clamping) and the physics
/// containment pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bounds {
    Rect { min: Vec2, max: Vec2 },
    Disk { center: Vec2, radius: f32 },
}

impl Bounds {
    pub fn unit_square() -> Self {
        Bounds::Rect {
            min: Vec2::ZERO,
            max: Vec2::ONE,
        }
    }

    pub fn disk(radius: f32) -> Self {
        Bounds::Disk {
            center: Vec2::ZERO,
            radius,
        }
    }

    pub fn center(&self) -> Vec2 {
        match *self {
            Bounds::Rect { min, max } => (min + max) * 0.5,
            Bounds::Disk { center, .. } => center,
        }
    }

    /// Characteristic size: rectangle width/height (the larger) or disk diameter.
    pub fn extent(&self) -> f32 {
        match *self {
            Bounds::Rect { min, max } => (max - min).max_element(),
            Bounds::Disk { radius, .. } => radius * 2.0,
        }
    }

    /// Radius used for radial falloffs: half the extent.
    pub fn radius(&self) -> f32 {
        self.extent() * 0.5
    }

    /// Clamp a point so a body of `body_radius` centred there stays inside.
    pub fn clamp(&self, point: Vec2, body_radius: f32) -> Vec2 {
        match *self {
            Bounds::Rect { min, max } => {
                let inset = Vec2::splat(body_radius).min((max - min) * 0.5);
                point.clamp(min + inset, max - inset)
            }
            Bounds::Disk { center, radius } => {
                let limit = (radius - body_radius).max(0.0);
                let offset = point - center;
                let d = offset.length();
                if d > limit && d > 0.0 {
                    center + offset * (limit / d)
                } else {
                    point
                }
            }
        }
    }

    pub fn contains(&self, point: Vec2, body_radius: f32) -> bool {
        let slack = 1e-4;
        match *self {
            Bounds::Rect { min, max } => {
                let inset = Vec2::splat(body_radius).min((max - min) * 0.5);
                point.cmpge(min + inset - slack).all() && point.cmple(max - inset + slack).all()
            }
            Bounds::Disk { center, radius } => {
                (point - center).length() <= (radius - body_radius).max(0.0) + slack
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub symbol: String,
    kind: NodeKind,
    weight: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub pinned: bool,
}

impl Node {
    /// Build a node outside any store (decoded snapshots). Kind and weight
    /// still come from the symbol table.
    pub fn detached(id: NodeId, symbol: &str, position: Vec2, velocity: Vec2, radius: f32) -> Self {
        let (kind, weight) = classify_symbol(symbol);
        Self {
            id,
            symbol: symbol.to_owned(),
            kind,
            weight,
            position,
            velocity,
            radius,
            pinned: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f32,
    pub created_at: Duration,
}

impl Link {
    #[inline]
    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }

    #[inline]
    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Outcome of [`GraphStore::toggle_link`].
#[derive(Clone, Debug, PartialEq)]
pub enum LinkToggle {
    Created(LinkId),
    Removed(Link),
    Ignored,
}

/// Point-in-time copy of the graph. Consumers read it, nobody mutates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

pub struct GraphStore {
    bounds: Bounds,
    node_radius: f32,
    nodes: Vec<Node>,
    links: Vec<Link>,
    next_node: u64,
    next_link: u64,
}

impl GraphStore {
    pub fn new(bounds: Bounds, node_radius: f32) -> Self {
        Self {
            bounds,
            node_radius,
            nodes: Vec::new(),
            links: Vec::new(),
            next_node: 0,
            next_link: 0,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    #[inline]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn add_node(&mut self, symbol: &str, position: Vec2) -> &Node {
        let (kind, weight) = classify_symbol(symbol);
        let id = NodeId(self.next_node);
        self.next_node += 1;
        let position = self.bounds.clamp(position, self.node_radius);
        log::debug!("[graph] add {} {} ({:?}) at ({:.3},{:.3})", id, symbol, kind, position.x, position.y);
        self.nodes.push(Node {
            id,
            symbol: symbol.to_owned(),
            kind,
            weight,
            position,
            velocity: Vec2::ZERO,
            radius: self.node_radius,
            pinned: false,
        });
        &self.nodes[self.nodes.len() - 1]
    }

    /// Remove a node and every link touching it. Returns `false` when absent.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.nodes.iter().position(|n| n.id == id) else {
            return false;
        };
        self.nodes.remove(index);
        let before = self.links.len();
        self.links.retain(|l| !l.touches(id));
        log::debug!("[graph] remove {} (+{} links)", id, before - self.links.len());
        true
    }

    /// Create a link between two live nodes, or remove the existing one for
    /// the same unordered pair.
    pub fn toggle_link(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f32,
        now: Duration,
    ) -> LinkToggle {
        if source == target || !self.contains(source) || !self.contains(target) {
            return LinkToggle::Ignored;
        }
        if let Some(index) = self.links.iter().position(|l| l.joins(source, target)) {
            let removed = self.links.remove(index);
            log::debug!("[graph] unlink {} {}-{}", removed.id, source, target);
            return LinkToggle::Removed(removed);
        }
        let id = LinkId(self.next_link);
        self.next_link += 1;
        let weight = weight.clamp(LINK_WEIGHT_MIN, LINK_WEIGHT_MAX);
        log::debug!("[graph] link {} {}-{} w={:.2}", id, source, target, weight);
        self.links.push(Link {
            id,
            source,
            target,
            weight,
            created_at: now,
        });
        LinkToggle::Created(id)
    }

    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<&Link> {
        self.links.iter().find(|l| l.joins(a, b))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.links.iter().filter(|l| l.touches(id)).count()
    }

    /// Nearest node within `radius` of `point`. Equal distances keep the
    /// earlier-inserted node.
    pub fn find_node_near(&self, point: Vec2, radius: f32) -> Option<&Node> {
        let mut best: Option<(&Node, f32)> = None;
        for node in &self.nodes {
            let d = node.position.distance(point);
            if d > radius {
                continue;
            }
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((node, d)),
            }
        }
        best.map(|(n, _)| n)
    }

    /// Nearest node other than `id`, with its distance.
    pub fn nearest_other(&self, id: NodeId) -> Option<(NodeId, f32)> {
        let origin = self.node(id)?.position;
        let mut best: Option<(NodeId, f32)> = None;
        for node in self.nodes.iter().filter(|n| n.id != id) {
            let d = node.position.distance(origin);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((node.id, d));
            }
        }
        best
    }

    pub fn set_pinned(&mut self, id: NodeId, pinned: bool) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.pinned = pinned;
                node.velocity = Vec2::ZERO;
                true
            }
            None => false,
        }
    }

    /// Move a node, keeping it inside the bounds.
    pub fn place_node(&mut self, id: NodeId, position: Vec2) -> bool {
        let bounds = self.bounds;
        match self.node_mut(id) {
            Some(node) => {
                node.position = bounds.clamp(position, node.radius);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }

    /// Replace the contents with a snapshot. Nodes get fresh ids and this
    /// store's body radius; links are remapped onto them and dangling or
    /// duplicate links are dropped.
    pub fn restore(&mut self, snapshot: &GraphSnapshot) {
        self.clear();
        let mut remap = fnv::FnvHashMap::default();
        for node in &snapshot.nodes {
            let fresh = self.add_node(&node.symbol, node.position).id;
            if let Some(n) = self.node_mut(fresh) {
                n.velocity = node.velocity;
            }
            remap.insert(node.id, fresh);
        }
        for link in &snapshot.links {
            let (Some(&a), Some(&b)) = (remap.get(&link.source), remap.get(&link.target)) else {
                continue;
            };
            if self.link_between(a, b).is_none() {
                self.toggle_link(a, b, link.weight, link.created_at);
            }
        }
    }
}
