//! Ephemeral text tags picked from the graph's kind composition.

use crate::constants::*;
use crate::graph::{Node, NodeKind};
use crate::metrics::ResonanceParameters;
use rand::distributions::{Distribution, WeightedIndex};
use rand::prelude::*;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagTrigger {
    /// Nodes were explicitly added; bypasses the rate limit.
    Add,
    Link,
    Unlink,
    /// Tension/spread moved noticeably between two derivations.
    Shift,
    AudioPeak,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub id: u64,
    pub text: String,
    /// Horizontal position in percent of the view.
    pub x: f32,
    /// Vertical position in percent of the view.
    pub y: f32,
    pub created_at: Duration,
    pub ttl: Duration,
}

impl Tag {
    #[inline]
    pub fn expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.created_at) >= self.ttl
    }
}

pub fn words_for(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::Fluid => &["onde", "sillage", "houle"],
        NodeKind::Mist => &["brume", "halo", "voile"],
        NodeKind::Kinetic => &["élan", "braise", "frisson"],
        NodeKind::Pulse => &["tension", "éclair", "battement"],
        NodeKind::Organic => &["pollen", "sève", "germe"],
        NodeKind::Mineral => &["gravité", "strate"],
        NodeKind::Orbit => &["orbite", "gravité", "dérive"],
        NodeKind::Vector => &["cap", "vecteur", "élan"],
        NodeKind::Reflective => &["reflet", "écho"],
        NodeKind::Thread => &["trame", "fil", "nœud"],
        NodeKind::Nocturne => &["silence", "nuit"],
        NodeKind::Spark => &["étincelle", "éclat"],
    }
}

#[derive(Clone, Debug)]
pub struct TagConfig {
    pub rate_limit: Duration,
    pub sweep_interval: Duration,
    pub second_word_chance: f64,
    pub shift_threshold: f32,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            rate_limit: TAG_RATE_LIMIT,
            sweep_interval: TAG_SWEEP_INTERVAL,
            second_word_chance: TAG_SECOND_WORD_CHANCE,
            shift_threshold: TAG_SHIFT_THRESHOLD,
        }
    }
}

pub struct TagEmitter {
    pub config: TagConfig,
    rng: StdRng,
    active: Vec<Tag>,
    last_emit: Option<Duration>,
    next_sweep: Duration,
    next_id: u64,
    last_params: Option<ResonanceParameters>,
}

impl TagEmitter {
    pub fn new(config: TagConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            active: Vec::new(),
            last_emit: None,
            next_sweep: Duration::ZERO,
            next_id: 0,
            last_params: None,
        }
    }

    pub fn active(&self) -> &[Tag] {
        &self.active
    }

    /// Try to emit a tag for `trigger`. Returns `None` when rate limited or
    /// when the graph is empty.
    pub fn emit(&mut self, nodes: &[Node], trigger: TagTrigger, now: Duration) -> Option<&Tag> {
        if trigger != TagTrigger::Add {
            if let Some(last) = self.last_emit {
                if now.saturating_sub(last) < self.config.rate_limit {
                    return None;
                }
            }
        }
        let text = self.pick_text(nodes)?;
        self.last_emit = Some(now);
        let ttl_ms = TAG_TTL_MIN_MS + self.rng.gen::<f32>() * TAG_TTL_SPAN_MS;
        let tag = Tag {
            id: self.next_id,
            text,
            x: 10.0 + self.rng.gen::<f32>() * 80.0,
            y: 15.0 + self.rng.gen::<f32>() * 70.0,
            created_at: now,
            ttl: Duration::from_secs_f32(ttl_ms / 1000.0),
        };
        self.next_id += 1;
        log::debug!("[tags] {:?} -> \"{}\"", trigger, tag.text);
        self.active.push(tag);
        self.active.last()
    }

    /// Compare against the previous parameters and emit a `Shift` tag when
    /// tension and spread moved by more than the threshold combined.
    pub fn observe(&mut self, params: &ResonanceParameters, nodes: &[Node], now: Duration) -> bool {
        let previous = self.last_params.replace(*params);
        let Some(previous) = previous else {
            return false;
        };
        let delta = (params.tension - previous.tension).abs() + (params.spread - previous.spread).abs();
        delta > self.config.shift_threshold && self.emit(nodes, TagTrigger::Shift, now).is_some()
    }

    /// Drop expired tags, at most once per sweep interval.
    pub fn expire(&mut self, now: Duration) -> usize {
        if now < self.next_sweep {
            return 0;
        }
        self.sweep(now)
    }

    /// Drop expired tags now.
    pub fn sweep(&mut self, now: Duration) -> usize {
        self.next_sweep = now + self.config.sweep_interval;
        let before = self.active.len();
        self.active.retain(|t| !t.expired(now));
        before - self.active.len()
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.last_params = None;
    }

    fn pick_text(&mut self, nodes: &[Node]) -> Option<String> {
        let mut weights = [0.0f32; NodeKind::ALL.len()];
        for node in nodes {
            weights[node.kind().index()] += node.weight().max(0.0);
        }
        let dist = WeightedIndex::new(weights).ok()?;
        let first_kind = NodeKind::ALL[dist.sample(&mut self.rng)];
        let first = self.pick_word(first_kind);
        if !self.rng.gen_bool(self.config.second_word_chance) {
            return Some(first.to_owned());
        }
        let second_kind = NodeKind::ALL[dist.sample(&mut self.rng)];
        let second = self.pick_word(second_kind);
        if second == first {
            Some(first.to_owned())
        } else {
            Some(format!("{first}{TAG_SEPARATOR}{second}"))
        }
    }

    fn pick_word(&mut self, kind: NodeKind) -> &'static str {
        let words = words_for(kind);
        let words = if words.is_empty() {
            words_for(NodeKind::Fluid)
        } else {
            words
        };
        words.choose(&mut self.rng).copied().unwrap_or("onde")
    }
}
