//! Saved constellations in a single JSON blob.
//!
//! The blob is an array of entries, newest first:
//! `[{ "id", "createdAt", "nodes": [{ "emoji", "position": {x,y},
//! "velocity": {x,y}, "radius" }], "links": [{ "source", "target",
//! "weight" }] }]`. Link endpoints are indices into `nodes`. `createdAt` is
//! written as epoch milliseconds; older blobs carry an RFC 3339 string, which
//! is read back as milliseconds. An unreadable blob reads as an empty list and
//! a single malformed entry is skipped. There is no eviction: the list grows
//! with every save.

use crate::constants::{LINK_WEIGHT_MAX, LINK_WEIGHT_MIN, STORAGE_KEY};
use crate::graph::{GraphSnapshot, Link, LinkId, Node, NodeId};
use fnv::FnvHashMap;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("blob backend unavailable: {0}")]
    Backend(String),
    #[error("malformed constellation blob: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Opaque local key-value blob store.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    entries: FnvHashMap<String, String>,
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Point {
    x: f32,
    y: f32,
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredNode {
    #[serde(alias = "symbol")]
    emoji: String,
    position: Point,
    #[serde(default)]
    velocity: Point,
    #[serde(default)]
    radius: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredLink {
    source: usize,
    target: usize,
    weight: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConstellation {
    id: String,
    #[serde(deserialize_with = "created_at_ms", default)]
    created_at: u64,
    #[serde(alias = "bubbles")]
    nodes: Vec<StoredNode>,
    #[serde(default)]
    links: Vec<StoredLink>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedAt {
    Millis(u64),
    Float(f64),
    Text(String),
}

fn created_at_ms<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(match CreatedAt::deserialize(deserializer)? {
        CreatedAt::Millis(ms) => ms,
        CreatedAt::Float(ms) if ms.is_finite() && ms > 0.0 => ms as u64,
        CreatedAt::Float(_) => 0,
        CreatedAt::Text(text) => match chrono::DateTime::parse_from_rfc3339(&text) {
            Ok(at) => u64::try_from(at.timestamp_millis()).unwrap_or(0),
            Err(e) => {
                log::warn!("[storage] unreadable createdAt {text:?}: {e}");
                0
            }
        },
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstellationSummary {
    pub id: String,
    /// Milliseconds since the Unix epoch, as supplied to `save`.
    pub created_at_ms: u64,
    pub count: usize,
}

impl StoredConstellation {
    fn summary(&self) -> ConstellationSummary {
        ConstellationSummary {
            id: self.id.clone(),
            created_at_ms: self.created_at,
            count: self.nodes.len(),
        }
    }

    fn encode(id: String, created_at: u64, snapshot: &GraphSnapshot) -> Self {
        let index: FnvHashMap<NodeId, usize> = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();
        let nodes = snapshot
            .nodes
            .iter()
            .map(|n| StoredNode {
                emoji: n.symbol.clone(),
                position: n.position.into(),
                velocity: n.velocity.into(),
                radius: n.radius,
            })
            .collect();
        let links = snapshot
            .links
            .iter()
            .filter_map(|l| {
                Some(StoredLink {
                    source: *index.get(&l.source)?,
                    target: *index.get(&l.target)?,
                    weight: l.weight,
                })
            })
            .collect();
        Self {
            id,
            created_at,
            nodes,
            links,
        }
    }

    fn decode(&self) -> GraphSnapshot {
        let nodes: Vec<Node> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                Node::detached(
                    NodeId(i as u64),
                    &n.emoji,
                    n.position.into(),
                    n.velocity.into(),
                    n.radius,
                )
            })
            .collect();
        let links = self
            .links
            .iter()
            .filter(|l| l.source != l.target && l.source < nodes.len() && l.target < nodes.len())
            .enumerate()
            .map(|(k, l)| Link {
                id: LinkId(k as u64),
                source: NodeId(l.source as u64),
                target: NodeId(l.target as u64),
                weight: l.weight.clamp(LINK_WEIGHT_MIN, LINK_WEIGHT_MAX),
                created_at: Duration::ZERO,
            })
            .collect();
        GraphSnapshot { nodes, links }
    }
}

pub struct ConstellationStore<B: BlobStore> {
    backend: B,
    key: String,
}

impl<B: BlobStore> ConstellationStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: &str) -> Self {
        Self {
            backend,
            key: key.to_owned(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Most recent first.
    pub fn list(&self) -> Vec<ConstellationSummary> {
        self.load_all().iter().map(StoredConstellation::summary).collect()
    }

    pub fn load(&self, id: &str) -> Option<GraphSnapshot> {
        self.load_all()
            .iter()
            .find(|entry| entry.id == id)
            .map(StoredConstellation::decode)
    }

    /// Prepend a snapshot. The id is derived from `created_at_ms` and made
    /// unique within the blob.
    pub fn save(&mut self, snapshot: &GraphSnapshot, created_at_ms: u64) -> Result<ConstellationSummary, StorageError> {
        let mut entries = self.load_all();
        let base = format!("constellation-{created_at_ms}");
        let mut id = base.clone();
        let mut suffix = 1;
        while entries.iter().any(|e| e.id == id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        let entry = StoredConstellation::encode(id, created_at_ms, snapshot);
        let summary = entry.summary();
        entries.insert(0, entry);
        let blob = serde_json::to_string(&entries)?;
        self.backend.set(&self.key, blob)?;
        log::info!("[storage] saved {} ({} nodes)", summary.id, summary.count);
        Ok(summary)
    }

    fn load_all(&self) -> Vec<StoredConstellation> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("[storage] read failed: {e}");
                return Vec::new();
            }
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("[storage] failed to parse stored constellations: {e}");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("[storage] skipping malformed constellation: {e}");
                    None
                }
            })
            .collect()
    }
}
