//! Resonance parameters derived from a graph snapshot.
//!
//! Everything here is a pure function of `(nodes, links)`. Links whose
//! endpoints are missing are skipped, non-finite positions are ignored, and
//! every output is clamped so an empty or degenerate graph still yields a
//! well-defined vector.

use crate::constants::*;
use crate::graph::{Bounds, Link, Node, NodeId, NodeKind};
use fnv::{FnvHashMap, FnvHasher};
use glam::Vec2;
use std::hash::Hasher;

#[inline]
fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Flat record of normalised scalars consumed by the renderer, the audio
/// mapping and the tag emitter. Fields a strategy does not compute stay 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResonanceParameters {
    // geometric
    pub density: f32,
    pub tension: f32,
    pub spread: f32,
    pub rhythm: f32,
    pub heterogeneity: f32,
    // type-weighted: animation
    pub flow: f32,
    pub turbulence: f32,
    /// Whole seconds in `[18, 50]`; 0 when not computed.
    pub loop_seconds: f32,
    // type-weighted: audio
    pub texture: f32,
    pub energy: f32,
    pub grain: f32,
    // type-weighted: text
    pub opacity: f32,
    pub fragmentation: f32,
    pub pace: f32,
    // graph shape
    pub centrality: f32,
    pub average_weight: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub link_count: usize,
    pub density: f32,
    pub mean_degree: f32,
    pub centrality: f32,
    pub average_weight: f32,
}

/// Counts and degree statistics. Links with a missing endpoint are ignored.
pub fn graph_metrics(nodes: &[Node], links: &[Link]) -> GraphMetrics {
    let node_count = nodes.len();
    let max_links = if node_count > 1 {
        (node_count * (node_count - 1)) as f32 / 2.0
    } else {
        1.0
    };

    let mut degrees: FnvHashMap<NodeId, usize> = nodes.iter().map(|n| (n.id, 0)).collect();
    let mut link_count = 0usize;
    let mut weight_sum = 0.0f32;
    for link in links {
        if !degrees.contains_key(&link.source) || !degrees.contains_key(&link.target) {
            continue;
        }
        for end in [link.source, link.target] {
            if let Some(d) = degrees.get_mut(&end) {
                *d += 1;
            }
        }
        link_count += 1;
        weight_sum += link.weight;
    }
    let (mean_degree, centrality) = if node_count > 0 {
        let total: usize = degrees.values().sum();
        let max = degrees.values().copied().max().unwrap_or(0);
        (
            total as f32 / node_count as f32,
            max as f32 / (node_count.saturating_sub(1)).max(1) as f32,
        )
    } else {
        (0.0, 0.0)
    };
    let average_weight = if link_count > 0 {
        weight_sum / link_count as f32
    } else {
        0.0
    };

    GraphMetrics {
        node_count,
        link_count,
        density: unit(link_count as f32 / max_links),
        mean_degree: unit(mean_degree / node_count.max(1) as f32),
        centrality: unit(centrality),
        average_weight,
    }
}

/// Raw (un-normalised) layout measurements.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphGeometry {
    pub centroid: Vec2,
    /// Root-mean-square distance from the centroid.
    pub rms_spread: f32,
    /// Mean Euclidean length of links whose endpoints both exist.
    pub mean_link_length: f32,
}

pub fn measure_geometry(nodes: &[Node], links: &[Link]) -> GraphGeometry {
    let finite: Vec<Vec2> = nodes
        .iter()
        .map(|n| n.position)
        .filter(|p| p.is_finite())
        .collect();
    if finite.is_empty() {
        return GraphGeometry::default();
    }
    let centroid = finite.iter().copied().sum::<Vec2>() / finite.len() as f32;
    let rms_spread = (finite
        .iter()
        .map(|p| p.distance_squared(centroid))
        .sum::<f32>()
        / finite.len() as f32)
        .sqrt();

    let positions: FnvHashMap<NodeId, Vec2> = nodes
        .iter()
        .filter(|n| n.position.is_finite())
        .map(|n| (n.id, n.position))
        .collect();
    let lengths: Vec<f32> = links
        .iter()
        .filter_map(|l| {
            let a = positions.get(&l.source)?;
            let b = positions.get(&l.target)?;
            Some(a.distance(*b))
        })
        .collect();
    let mean_link_length = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<f32>() / lengths.len() as f32
    };

    GraphGeometry {
        centroid,
        rms_spread,
        mean_link_length,
    }
}

/// Per-symbol scalar in `[0, 1]`: FNV-1a over the UTF-8 bytes.
pub fn symbol_scalar(symbol: &str) -> f32 {
    let mut hasher = FnvHasher::default();
    hasher.write(symbol.as_bytes());
    (hasher.finish() % 1000) as f32 / 999.0
}

/// Normalisation lengths for the geometric strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometricScales {
    pub tension_length: f32,
    pub spread_length: f32,
    pub rhythm_count: f32,
}

impl GeometricScales {
    pub fn for_bounds(bounds: &Bounds) -> Self {
        let extent = bounds.extent().max(f32::EPSILON);
        Self {
            tension_length: extent * TENSION_EXTENT_FRACTION,
            spread_length: extent * SPREAD_EXTENT_FRACTION,
            rhythm_count: RHYTHM_REFERENCE_COUNT,
        }
    }
}

impl Default for GeometricScales {
    fn default() -> Self {
        Self::for_bounds(&Bounds::unit_square())
    }
}

pub fn derive_geometric(nodes: &[Node], links: &[Link], scales: &GeometricScales) -> ResonanceParameters {
    if nodes.is_empty() {
        return ResonanceParameters::default();
    }
    let metrics = graph_metrics(nodes, links);
    let geometry = measure_geometry(nodes, links);
    let heterogeneity =
        nodes.iter().map(|n| symbol_scalar(&n.symbol)).sum::<f32>() / nodes.len() as f32;
    ResonanceParameters {
        density: metrics.density,
        tension: unit(geometry.mean_link_length / scales.tension_length),
        spread: unit(geometry.rms_spread / scales.spread_length),
        rhythm: unit((metrics.node_count + metrics.link_count) as f32 / scales.rhythm_count),
        heterogeneity: unit(heterogeneity),
        centrality: metrics.centrality,
        average_weight: unit(metrics.average_weight),
        ..ResonanceParameters::default()
    }
}

/// Channel contributions of one node kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindGrammar {
    pub flow: f32,
    pub turbulence: f32,
    pub texture: f32,
    pub energy: f32,
    pub opacity: f32,
    pub fragmentation: f32,
}

const fn grammar(flow: f32, turbulence: f32, texture: f32, energy: f32, opacity: f32, fragmentation: f32) -> KindGrammar {
    KindGrammar { flow, turbulence, texture, energy, opacity, fragmentation }
}

pub fn kind_grammar(kind: NodeKind) -> KindGrammar {
    match kind {
        NodeKind::Fluid => grammar(0.9, 0.4, 0.7, 0.3, 0.65, 0.2),
        NodeKind::Mist => grammar(0.6, 0.5, 0.9, 0.2, 0.5, 0.35),
        NodeKind::Kinetic => grammar(0.4, 0.9, 0.4, 0.95, 0.4, 0.6),
        NodeKind::Pulse => grammar(0.5, 0.8, 0.3, 1.0, 0.35, 0.65),
        NodeKind::Organic => grammar(0.7, 0.5, 0.6, 0.4, 0.7, 0.25),
        NodeKind::Mineral => grammar(0.3, 0.2, 0.5, 0.2, 0.8, 0.15),
        NodeKind::Orbit => grammar(0.65, 0.3, 0.6, 0.35, 0.6, 0.3),
        NodeKind::Vector => grammar(0.55, 0.6, 0.45, 0.6, 0.5, 0.45),
        NodeKind::Reflective => grammar(0.4, 0.25, 0.8, 0.25, 0.85, 0.15),
        NodeKind::Thread => grammar(0.6, 0.4, 0.5, 0.3, 0.75, 0.2),
        NodeKind::Nocturne => grammar(0.45, 0.35, 0.7, 0.2, 0.9, 0.1),
        NodeKind::Spark => grammar(0.75, 0.85, 0.4, 0.8, 0.45, 0.7),
    }
}

pub fn derive_type_weighted(nodes: &[Node], links: &[Link]) -> ResonanceParameters {
    let metrics = graph_metrics(nodes, links);
    let mut totals = grammar(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for node in nodes {
        let g = kind_grammar(node.kind());
        let w = node.weight();
        totals.flow += g.flow * w;
        totals.turbulence += g.turbulence * w;
        totals.texture += g.texture * w;
        totals.energy += g.energy * w;
        totals.opacity += g.opacity * w;
        totals.fragmentation += g.fragmentation * w;
    }
    let divisor = nodes.len().max(1) as f32;
    let norm = |v: f32| unit(v / divisor);

    ResonanceParameters {
        density: metrics.density,
        flow: norm(totals.flow),
        turbulence: norm(totals.turbulence),
        loop_seconds: (LOOP_SECONDS_MIN + (1.0 - metrics.density) * LOOP_SECONDS_SPAN).round(),
        texture: norm(totals.texture),
        energy: norm(totals.energy),
        grain: unit(metrics.centrality * 0.6 + metrics.average_weight * 0.4),
        opacity: norm(totals.opacity),
        fragmentation: norm(totals.fragmentation),
        pace: unit(0.4 + metrics.mean_degree * 0.6),
        centrality: metrics.centrality,
        average_weight: unit(metrics.average_weight),
        ..ResonanceParameters::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricsStrategy {
    Geometric,
    TypeWeighted,
    /// Geometric fields plus the type-weighted channels.
    Combined,
}

#[derive(Clone, Debug)]
pub struct MetricsDeriver {
    pub strategy: MetricsStrategy,
    pub scales: GeometricScales,
}

impl MetricsDeriver {
    pub fn new(strategy: MetricsStrategy, bounds: &Bounds) -> Self {
        Self {
            strategy,
            scales: GeometricScales::for_bounds(bounds),
        }
    }

    pub fn derive(&self, nodes: &[Node], links: &[Link]) -> ResonanceParameters {
        match self.strategy {
            MetricsStrategy::Geometric => derive_geometric(nodes, links, &self.scales),
            MetricsStrategy::TypeWeighted => derive_type_weighted(nodes, links),
            MetricsStrategy::Combined => {
                let geo = derive_geometric(nodes, links, &self.scales);
                ResonanceParameters {
                    tension: geo.tension,
                    spread: geo.spread,
                    rhythm: geo.rhythm,
                    heterogeneity: geo.heterogeneity,
                    ..derive_type_weighted(nodes, links)
                }
            }
        }
    }
}

impl Default for MetricsDeriver {
    fn default() -> Self {
        Self::new(MetricsStrategy::Combined, &Bounds::unit_square())
    }
}
