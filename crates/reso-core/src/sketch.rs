//! Frame scheduler tying the graph, physics, metrics, gestures, tags, audio
//! and uniforms together.
//!
//! Everything runs on one thread. Pointer handlers and [`Sketch::frame_at`]
//! both take `&mut self`, so a gesture can only land between two frames and
//! each frame integrates a consistent graph.

use crate::audio::{AudioInput, AudioStatus, LevelSource, PeakDetector};
use crate::constants::*;
use crate::graph::{GraphStore, Link, LinkToggle, Node, NodeId};
use crate::interaction::{
    place_symbols, Events, InteractionConfig, InteractionController, InteractionEvent, LinkGesture,
    Picker, PointerId, TapAction,
};
use crate::metrics::{MetricsDeriver, MetricsStrategy, ResonanceParameters};
use crate::physics::{PhysicsConfig, PhysicsEngine};
use crate::storage::{BlobStore, ConstellationStore, ConstellationSummary};
use crate::tags::{Tag, TagConfig, TagEmitter, TagTrigger};
use crate::uniforms::{Mode, ShaderUniforms, UniformDriver};
use glam::{vec2, Vec2};
use instant::Instant;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct SketchConfig {
    pub physics: PhysicsConfig,
    pub interaction: InteractionConfig,
    pub metrics: MetricsStrategy,
    pub tags: TagConfig,
    /// Symbol placed at the centre on start, if any.
    pub seed_symbol: Option<String>,
    /// Silent physics steps run after an explicit add.
    pub settle_steps: usize,
    /// Tangential speed given to freshly added nodes.
    pub initial_drift: f32,
}

impl SketchConfig {
    /// Rectangular spring/repulsion layout; taps open the picker, links by
    /// tapping two nodes.
    pub fn planar() -> Self {
        let physics = PhysicsConfig::planar();
        let interaction =
            InteractionConfig::for_bounds(&physics.bounds, TapAction::OpenPicker, LinkGesture::Select);
        Self {
            physics,
            interaction,
            metrics: MetricsStrategy::Combined,
            tags: TagConfig::default(),
            seed_symbol: Some("🌊".to_owned()),
            settle_steps: 30,
            initial_drift: 0.0,
        }
    }

    /// Circular bubble layout with collisions; taps push bubbles away, links
    /// by dropping one bubble next to another.
    pub fn bubble() -> Self {
        let physics = PhysicsConfig::bubble();
        let interaction =
            InteractionConfig::for_bounds(&physics.bounds, TapAction::Impulse, LinkGesture::Proximity);
        Self {
            physics,
            interaction,
            metrics: MetricsStrategy::Combined,
            tags: TagConfig::default(),
            seed_symbol: Some("🌊".to_owned()),
            settle_steps: 0,
            initial_drift: BUBBLE_BASE_SPEED / 2.0,
        }
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self::planar()
    }
}

/// Read-only view handed to the renderer after each frame.
pub struct FrameView<'a> {
    pub nodes: &'a [Node],
    pub links: &'a [Link],
    pub tags: &'a [Tag],
    pub params: &'a ResonanceParameters,
    pub uniforms: &'a ShaderUniforms,
    pub level: f32,
    pub mode: Mode,
    pub picker: Option<&'a Picker>,
    pub selected: Option<NodeId>,
}

pub struct Sketch {
    config: SketchConfig,
    store: GraphStore,
    physics: PhysicsEngine,
    deriver: MetricsDeriver,
    controller: InteractionController,
    tags: TagEmitter,
    audio: AudioInput,
    peaks: PeakDetector,
    uniforms: UniformDriver,
    params: ResonanceParameters,
    mode: Mode,
    level: f32,
    clock: Instant,
    last_frame: Option<Duration>,
    frames: u64,
    running: bool,
}

impl Sketch {
    pub fn new(config: SketchConfig, seed: u64) -> Self {
        let mut store = GraphStore::new(config.physics.bounds, config.physics.node_radius);
        if let Some(symbol) = config.seed_symbol.as_deref() {
            let center = config.physics.bounds.center();
            store.add_node(symbol, center);
        }
        let deriver = MetricsDeriver::new(config.metrics, &config.physics.bounds);
        let params = deriver.derive(store.nodes(), store.links());
        Self {
            physics: PhysicsEngine::new(config.physics.clone()),
            controller: InteractionController::new(config.interaction.clone()),
            tags: TagEmitter::new(config.tags.clone(), seed),
            audio: AudioInput::default(),
            peaks: PeakDetector::default(),
            uniforms: UniformDriver::default(),
            params,
            mode: Mode::Stop,
            level: 0.0,
            clock: Instant::now(),
            last_frame: None,
            frames: 0,
            running: true,
            deriver,
            store,
            config,
        }
    }

    /// Time since the sketch was created.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn params(&self) -> &ResonanceParameters {
        &self.params
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn audio_status(&self) -> AudioStatus {
        self.audio.status()
    }

    pub fn tags(&self) -> &[Tag] {
        self.tags.active()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        self.uniforms.uniforms()
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.uniforms.set_resolution(width, height);
    }

    /// Run one frame at the wall clock.
    pub fn frame(&mut self) -> Option<FrameView<'_>> {
        let now = self.elapsed();
        self.frame_at(now)
    }

    /// Run one frame at `now` (time since start). Returns `None` once torn down.
    pub fn frame_at(&mut self, now: Duration) -> Option<FrameView<'_>> {
        if !self.running {
            return None;
        }
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.saturating_sub(last).as_secs_f32());
        self.last_frame = Some(now);

        self.physics.advance(&mut self.store, dt);
        let events = self.controller.poll(&mut self.store, now);
        self.dispatch(events, now);

        self.params = self.deriver.derive(self.store.nodes(), self.store.links());
        self.tags.observe(&self.params, self.store.nodes(), now);

        self.level = self.audio.sample(now);
        if self.peaks.update(self.level, now) {
            self.tags.emit(self.store.nodes(), TagTrigger::AudioPeak, now);
        }
        self.uniforms.update(&self.params, self.level, dt, self.mode);
        self.tags.expire(now);
        self.frames += 1;
        Some(self.view())
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            nodes: self.store.nodes(),
            links: self.store.links(),
            tags: self.tags.active(),
            params: &self.params,
            uniforms: self.uniforms.uniforms(),
            level: self.level,
            mode: self.mode,
            picker: self.controller.picker(),
            selected: self.controller.selected(),
        }
    }

    pub fn pointer_down(&mut self, pointer: PointerId, point: Vec2, now: Duration) -> Events {
        if !self.running {
            return Events::new();
        }
        let events = self.controller.pointer_down(&mut self.store, pointer, point, now);
        self.dispatch(events, now)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, point: Vec2, now: Duration) -> Events {
        if !self.running {
            return Events::new();
        }
        let events = self.controller.pointer_move(&mut self.store, pointer, point, now);
        self.dispatch(events, now)
    }

    pub fn pointer_up(&mut self, pointer: PointerId, point: Vec2, now: Duration) -> Events {
        if !self.running {
            return Events::new();
        }
        let events = self.controller.pointer_up(&mut self.store, pointer, point, now);
        self.dispatch(events, now)
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        self.controller.pointer_cancel(&mut self.store, pointer);
    }

    pub fn toggle_picker_symbol(&mut self, symbol: &str) -> bool {
        self.controller.toggle_picker_symbol(symbol)
    }

    pub fn open_picker(&mut self, at: Vec2) {
        self.controller.open_picker(at);
    }

    pub fn close_picker(&mut self) -> Events {
        self.controller.close_picker()
    }

    pub fn commit_picker(&mut self, now: Duration) -> Events {
        let events = self.controller.commit_picker(&mut self.store);
        self.dispatch(events, now)
    }

    /// Explicit add outside the picker (seeding, keyboard shortcuts).
    pub fn add_symbols(&mut self, symbols: &[String], at: Vec2, now: Duration) -> Vec<NodeId> {
        let ids = place_symbols(&mut self.store, symbols, at, self.config.interaction.picker_spacing);
        let mut events = Events::new();
        events.push(InteractionEvent::NodesAdded(ids.clone()));
        self.dispatch(events, now);
        ids
    }

    /// Explicit connect gesture: creates the link or removes an existing one.
    pub fn connect(&mut self, a: NodeId, b: NodeId, now: Duration) -> LinkToggle {
        let outcome = self.store.toggle_link(a, b, DEFAULT_LINK_WEIGHT, now);
        match outcome {
            LinkToggle::Created(_) => {
                self.tags.emit(self.store.nodes(), TagTrigger::Link, now);
            }
            LinkToggle::Removed(_) => {
                self.tags.emit(self.store.nodes(), TagTrigger::Unlink, now);
            }
            LinkToggle::Ignored => {}
        }
        outcome
    }

    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.controller.forget_node(&mut self.store, id);
        self.store.remove_node(id)
    }

    /// Switch mode. Returns true when the caller should start an audio
    /// capture request (entering play with no capture in flight).
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        match mode {
            Mode::Play => {
                self.controller.reset(&mut self.store);
                self.controller.editing_enabled = false;
                self.audio.request()
            }
            Mode::Stop => {
                self.controller.editing_enabled = true;
                self.audio.release();
                false
            }
        }
    }

    pub fn audio_ready(&mut self, source: Box<dyn LevelSource>) -> bool {
        self.audio.resolve(source)
    }

    pub fn audio_failed(&mut self, reason: &str) {
        self.audio.fail(reason);
    }

    /// Best-effort save; failures are logged and reported as `None`.
    pub fn save<B: BlobStore>(
        &self,
        storage: &mut ConstellationStore<B>,
        created_at_ms: u64,
    ) -> Option<ConstellationSummary> {
        match storage.save(&self.store.snapshot(), created_at_ms) {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::warn!("[sketch] save failed: {e}");
                None
            }
        }
    }

    /// Replace the graph with a saved constellation. Unknown ids leave the
    /// current graph untouched.
    pub fn load<B: BlobStore>(&mut self, storage: &ConstellationStore<B>, id: &str) -> bool {
        let Some(snapshot) = storage.load(id) else {
            return false;
        };
        self.controller.reset(&mut self.store);
        self.store.restore(&snapshot);
        self.tags.clear();
        self.params = self.deriver.derive(self.store.nodes(), self.store.links());
        true
    }

    /// Stop producing frames and release audio. Safe to call repeatedly and
    /// before capture ever resolved.
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.controller.reset(&mut self.store);
        self.audio.release();
        log::info!("[sketch] torn down after {} frames", self.frames);
    }

    fn dispatch(&mut self, events: Events, now: Duration) -> Events {
        for event in &events {
            match event {
                InteractionEvent::Impulse { at, strength } => {
                    self.physics.apply_radial_impulse(&mut self.store, *at, *strength);
                }
                InteractionEvent::Linked { .. } => {
                    self.tags.emit(self.store.nodes(), TagTrigger::Link, now);
                }
                InteractionEvent::Unlinked { .. } => {
                    self.tags.emit(self.store.nodes(), TagTrigger::Unlink, now);
                }
                InteractionEvent::NodesAdded(ids) => {
                    self.give_drift(ids);
                    if self.config.settle_steps > 0 {
                        self.physics
                            .settle(&mut self.store, self.config.settle_steps, 1.0 / REFERENCE_FPS);
                    }
                    self.tags.emit(self.store.nodes(), TagTrigger::Add, now);
                }
                _ => {}
            }
        }
        events
    }

    fn give_drift(&mut self, ids: &[NodeId]) {
        let drift = self.config.initial_drift;
        if drift <= 0.0 {
            return;
        }
        let center = self.store.bounds().center();
        for &id in ids {
            if let Some(node) = self.store.node_mut(id) {
                let offset = node.position - center;
                let tangent = if offset.length() > DISTANCE_EPSILON {
                    offset.perp().normalize()
                } else {
                    let angle = (id.0 as f32 / 10.0) * std::f32::consts::TAU;
                    vec2(angle.sin(), angle.cos())
                };
                node.velocity += tangent * drift;
            }
        }
    }
}
