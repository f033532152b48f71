//! Pointer gestures → graph mutations.
//!
//! Each active pointer runs its own small state machine:
//!
//! ```text
//! press on canvas ─▶ AwaitingLongPress ─(long press, still)─▶ picker opens
//!                           └─(quick release, still)─▶ tap (picker or impulse)
//! press on node ──▶ Dragging ─(held still)─▶ PendingDelete ─(timeout)─▶ deleted
//!                      ▲            │
//!                      └──(moved)───┘        release ─▶ unpin, fling, link
//! ```
//!
//! Timers are deadlines checked by [`InteractionController::poll`] once per
//! frame; nothing here runs asynchronously.

use crate::constants::*;
use crate::graph::{Bounds, GraphStore, LinkId, LinkToggle, NodeId};
use fnv::FnvHashMap;
use glam::{vec2, Vec2};
use smallvec::SmallVec;
use std::time::Duration;

pub type PointerId = i32;

/// What a quick tap on empty canvas does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapAction {
    OpenPicker,
    Impulse,
}

/// How links are drawn by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkGesture {
    /// Drop a dragged node near another one.
    Proximity,
    /// Tap one node, then another.
    Select,
}

#[derive(Clone, Debug)]
pub struct InteractionConfig {
    pub tap_action: TapAction,
    pub link_gesture: LinkGesture,
    pub tap_slop: f32,
    pub tap_max: Duration,
    pub long_press: Duration,
    pub delete_hold: Duration,
    pub delete_confirm: Duration,
    pub pick_radius_scale: f32,
    pub link_distance: f32,
    pub impulse_strength: f32,
    pub picker_spacing: f32,
}

impl InteractionConfig {
    pub fn for_bounds(bounds: &Bounds, tap_action: TapAction, link_gesture: LinkGesture) -> Self {
        let extent = bounds.extent();
        Self {
            tap_action,
            link_gesture,
            tap_slop: extent * TAP_SLOP_FRACTION,
            tap_max: TAP_MAX,
            long_press: LONG_PRESS,
            delete_hold: DELETE_HOLD,
            delete_confirm: DELETE_CONFIRM,
            pick_radius_scale: PICK_RADIUS_SCALE,
            link_distance: extent * LINK_DISTANCE_FRACTION,
            impulse_strength: IMPULSE_STRENGTH,
            picker_spacing: extent * PICKER_SPACING_FRACTION,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self::for_bounds(&Bounds::unit_square(), TapAction::OpenPicker, LinkGesture::Proximity)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
    PickerOpened { at: Vec2 },
    PickerClosed,
    Impulse { at: Vec2, strength: f32 },
    DragStarted(NodeId),
    Released { node: NodeId, velocity: Vec2 },
    Linked { source: NodeId, target: NodeId, link: LinkId },
    Unlinked { source: NodeId, target: NodeId },
    Selected(NodeId),
    SelectionCleared,
    DeletePending(NodeId),
    DeleteCancelled(NodeId),
    Deleted(NodeId),
    NodesAdded(Vec<NodeId>),
}

pub type Events = SmallVec<[InteractionEvent; 2]>;

#[derive(Clone, Copy, Debug)]
struct DragTrack {
    node: NodeId,
    last_point: Vec2,
    last_time: Duration,
    anchor: Vec2,
    still_since: Duration,
    moved: bool,
}

#[derive(Clone, Copy, Debug)]
enum PointerPhase {
    AwaitingLongPress {
        origin: Vec2,
        started: Duration,
        cancelled: bool,
    },
    Dragging(DragTrack),
    PendingDelete {
        track: DragTrack,
        deadline: Duration,
    },
}

/// Symbols chosen in the creation picker, dropped around `anchor` on commit.
#[derive(Clone, Debug, PartialEq)]
pub struct Picker {
    pub anchor: Vec2,
    pub selected: Vec<String>,
}

pub struct InteractionController {
    pub config: InteractionConfig,
    /// When false (play mode) presses on nodes behave like canvas presses.
    pub editing_enabled: bool,
    pointers: FnvHashMap<PointerId, PointerPhase>,
    selected: Option<NodeId>,
    picker: Option<Picker>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            editing_enabled: true,
            pointers: FnvHashMap::default(),
            selected: None,
            picker: None,
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn picker(&self) -> Option<&Picker> {
        self.picker.as_ref()
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Node currently held by any pointer, with whether it is about to be deleted.
    pub fn held_nodes(&self) -> impl Iterator<Item = (NodeId, bool)> + '_ {
        self.pointers.values().filter_map(|phase| match phase {
            PointerPhase::Dragging(t) => Some((t.node, false)),
            PointerPhase::PendingDelete { track, .. } => Some((track.node, true)),
            PointerPhase::AwaitingLongPress { .. } => None,
        })
    }

    pub fn pointer_down(
        &mut self,
        store: &mut GraphStore,
        pointer: PointerId,
        point: Vec2,
        now: Duration,
    ) -> Events {
        let mut events = Events::new();
        if let Some(previous) = self.pointers.remove(&pointer) {
            release_without_fling(store, previous);
        }
        let pick_radius = store.node_radius() * self.config.pick_radius_scale;
        // A node held by another pointer cannot be grabbed again; the press
        // falls through to the canvas.
        let hit = if self.editing_enabled {
            store
                .find_node_near(point, pick_radius)
                .map(|n| n.id)
                .filter(|&id| !self.is_held(id))
        } else {
            None
        };
        let phase = match hit {
            Some(node) => {
                store.set_pinned(node, true);
                store.place_node(node, point);
                let at = store.node(node).map_or(point, |n| n.position);
                events.push(InteractionEvent::DragStarted(node));
                PointerPhase::Dragging(DragTrack {
                    node,
                    last_point: at,
                    last_time: now,
                    anchor: at,
                    still_since: now,
                    moved: false,
                })
            }
            None => PointerPhase::AwaitingLongPress {
                origin: point,
                started: now,
                cancelled: false,
            },
        };
        self.pointers.insert(pointer, phase);
        events
    }

    fn is_held(&self, node: NodeId) -> bool {
        self.pointers.values().any(|phase| phase_node(phase) == Some(node))
    }

    pub fn pointer_move(
        &mut self,
        store: &mut GraphStore,
        pointer: PointerId,
        point: Vec2,
        now: Duration,
    ) -> Events {
        let mut events = Events::new();
        let slop = self.config.tap_slop;
        let Some(phase) = self.pointers.get_mut(&pointer) else {
            return events;
        };
        match phase {
            PointerPhase::AwaitingLongPress {
                origin, cancelled, ..
            } => {
                if point.distance(*origin) > slop {
                    *cancelled = true;
                }
            }
            PointerPhase::Dragging(track) => {
                drag_to(store, track, point, now, slop);
            }
            PointerPhase::PendingDelete { track, .. } => {
                if drag_to(store, track, point, now, slop) {
                    events.push(InteractionEvent::DeleteCancelled(track.node));
                    let track = *track;
                    *phase = PointerPhase::Dragging(track);
                }
            }
        }
        events
    }

    pub fn pointer_up(
        &mut self,
        store: &mut GraphStore,
        pointer: PointerId,
        point: Vec2,
        now: Duration,
    ) -> Events {
        let mut events = Events::new();
        let Some(phase) = self.pointers.remove(&pointer) else {
            return events;
        };
        match phase {
            PointerPhase::AwaitingLongPress {
                origin,
                started,
                cancelled,
            } => {
                let is_tap = !cancelled
                    && point.distance(origin) <= self.config.tap_slop
                    && now.saturating_sub(started) <= self.config.tap_max;
                if is_tap {
                    if self.selected.take().is_some() {
                        events.push(InteractionEvent::SelectionCleared);
                    }
                    match self.config.tap_action {
                        TapAction::OpenPicker => {
                            self.open_picker(point);
                            events.push(InteractionEvent::PickerOpened { at: point });
                        }
                        TapAction::Impulse => events.push(InteractionEvent::Impulse {
                            at: point,
                            strength: self.config.impulse_strength,
                        }),
                    }
                }
            }
            PointerPhase::Dragging(track) => {
                self.finish_drag(store, track, point, now, &mut events);
            }
            PointerPhase::PendingDelete { track, .. } => {
                events.push(InteractionEvent::DeleteCancelled(track.node));
                self.finish_drag(store, track, point, now, &mut events);
            }
        }
        events
    }

    /// Drop a pointer without any gesture outcome (pointercancel, blur).
    pub fn pointer_cancel(&mut self, store: &mut GraphStore, pointer: PointerId) {
        if let Some(phase) = self.pointers.remove(&pointer) {
            release_without_fling(store, phase);
        }
    }

    /// Drop every pointer, the selection and the picker.
    pub fn reset(&mut self, store: &mut GraphStore) {
        for (_, phase) in self.pointers.drain() {
            release_without_fling(store, phase);
        }
        self.selected = None;
        self.picker = None;
    }

    /// Fire elapsed timers: long-press picker, delete hold, delete confirm.
    pub fn poll(&mut self, store: &mut GraphStore, now: Duration) -> Events {
        let mut events = Events::new();
        let mut finished: SmallVec<[PointerId; 2]> = SmallVec::new();
        let mut picker_at = None;
        for (&pointer, phase) in self.pointers.iter_mut() {
            match *phase {
                PointerPhase::AwaitingLongPress {
                    origin,
                    started,
                    cancelled,
                } => {
                    if !cancelled && now.saturating_sub(started) >= self.config.long_press {
                        picker_at = Some(origin);
                        finished.push(pointer);
                    }
                }
                PointerPhase::Dragging(track) => {
                    if !store.contains(track.node) {
                        finished.push(pointer);
                    } else if now.saturating_sub(track.still_since) >= self.config.delete_hold {
                        log::debug!("[interaction] hold on {} -> pending delete", track.node);
                        events.push(InteractionEvent::DeletePending(track.node));
                        *phase = PointerPhase::PendingDelete {
                            track,
                            deadline: now + self.config.delete_confirm,
                        };
                    }
                }
                PointerPhase::PendingDelete { track, deadline } => {
                    if now >= deadline {
                        if store.remove_node(track.node) {
                            events.push(InteractionEvent::Deleted(track.node));
                        }
                        if self.selected == Some(track.node) {
                            self.selected = None;
                        }
                        finished.push(pointer);
                    }
                }
            }
        }
        for pointer in finished {
            self.pointers.remove(&pointer);
        }
        if let Some(at) = picker_at {
            self.open_picker(at);
            events.push(InteractionEvent::PickerOpened { at });
        }
        events
    }

    pub fn open_picker(&mut self, at: Vec2) {
        self.picker = Some(Picker {
            anchor: at,
            selected: Vec::new(),
        });
    }

    pub fn close_picker(&mut self) -> Events {
        let mut events = Events::new();
        if self.picker.take().is_some() {
            events.push(InteractionEvent::PickerClosed);
        }
        events
    }

    /// Toggle a symbol in the open picker. Returns whether it is now selected.
    pub fn toggle_picker_symbol(&mut self, symbol: &str) -> bool {
        let Some(picker) = self.picker.as_mut() else {
            return false;
        };
        if let Some(i) = picker.selected.iter().position(|s| s == symbol) {
            picker.selected.remove(i);
            false
        } else {
            picker.selected.push(symbol.to_owned());
            true
        }
    }

    /// Add every picked symbol around the picker anchor and close the picker.
    pub fn commit_picker(&mut self, store: &mut GraphStore) -> Events {
        let mut events = Events::new();
        let Some(picker) = self.picker.take() else {
            return events;
        };
        if picker.selected.is_empty() {
            self.picker = Some(picker);
            return events;
        }
        let ids = place_symbols(store, &picker.selected, picker.anchor, self.config.picker_spacing);
        events.push(InteractionEvent::NodesAdded(ids));
        events.push(InteractionEvent::PickerClosed);
        events
    }

    /// Forget any state that refers to a node removed elsewhere.
    pub fn forget_node(&mut self, store: &mut GraphStore, node: NodeId) {
        if self.selected == Some(node) {
            self.selected = None;
        }
        let stale: SmallVec<[PointerId; 2]> = self
            .pointers
            .iter()
            .filter(|(_, phase)| phase_node(phase) == Some(node))
            .map(|(&p, _)| p)
            .collect();
        for pointer in stale {
            self.pointer_cancel(store, pointer);
        }
    }

    fn finish_drag(
        &mut self,
        store: &mut GraphStore,
        track: DragTrack,
        point: Vec2,
        now: Duration,
        events: &mut Events,
    ) {
        let node = track.node;
        if !store.contains(node) {
            return;
        }
        store.place_node(node, point);
        let released_at = store.node(node).map_or(point, |n| n.position);
        let moved = track.moved || released_at.distance(track.anchor) > self.config.tap_slop;
        let elapsed = now.saturating_sub(track.last_time).as_secs_f32().max(DRAG_TIME_FLOOR_SEC);
        let velocity = if moved {
            (released_at - track.last_point) / elapsed
        } else {
            Vec2::ZERO
        };
        store.set_pinned(node, false);
        if let Some(n) = store.node_mut(node) {
            n.velocity = velocity;
        }
        events.push(InteractionEvent::Released { node, velocity });

        match self.config.link_gesture {
            LinkGesture::Proximity => {
                let Some((other, distance)) = store.nearest_other(node) else {
                    return;
                };
                if distance > self.config.link_distance || store.link_between(node, other).is_some() {
                    return;
                }
                let weight = (1.0 - distance / self.config.link_distance).clamp(PROXIMITY_WEIGHT_MIN, 1.0);
                if let LinkToggle::Created(link) = store.toggle_link(node, other, weight, now) {
                    events.push(InteractionEvent::Linked {
                        source: node,
                        target: other,
                        link,
                    });
                }
            }
            LinkGesture::Select if !moved => match self.selected {
                Some(current) if current != node => {
                    self.selected = None;
                    match store.toggle_link(current, node, DEFAULT_LINK_WEIGHT, now) {
                        LinkToggle::Created(link) => events.push(InteractionEvent::Linked {
                            source: current,
                            target: node,
                            link,
                        }),
                        LinkToggle::Removed(_) => events.push(InteractionEvent::Unlinked {
                            source: current,
                            target: node,
                        }),
                        LinkToggle::Ignored => events.push(InteractionEvent::SelectionCleared),
                    }
                }
                Some(_) => {
                    self.selected = None;
                    events.push(InteractionEvent::SelectionCleared);
                }
                None => {
                    self.selected = Some(node);
                    events.push(InteractionEvent::Selected(node));
                }
            },
            LinkGesture::Select => {}
        }
    }
}

/// Move a dragged node. Returns true when the pointer left the slop circle,
/// which restarts the hold timer.
fn drag_to(store: &mut GraphStore, track: &mut DragTrack, point: Vec2, now: Duration, slop: f32) -> bool {
    store.place_node(track.node, point);
    let at = store.node(track.node).map_or(point, |n| n.position);
    track.last_point = at;
    track.last_time = now;
    if at.distance(track.anchor) > slop {
        track.moved = true;
        track.anchor = at;
        track.still_since = now;
        return true;
    }
    false
}

fn phase_node(phase: &PointerPhase) -> Option<NodeId> {
    match phase {
        PointerPhase::Dragging(t) => Some(t.node),
        PointerPhase::PendingDelete { track, .. } => Some(track.node),
        PointerPhase::AwaitingLongPress { .. } => None,
    }
}

fn release_without_fling(store: &mut GraphStore, phase: PointerPhase) {
    if let Some(node) = phase_node(&phase) {
        store.set_pinned(node, false);
    }
}

/// Add symbols on a golden-angle spiral around `anchor`.
pub fn place_symbols(store: &mut GraphStore, symbols: &[String], anchor: Vec2, spacing: f32) -> Vec<NodeId> {
    const GOLDEN_ANGLE: f32 = 2.399_963;
    symbols
        .iter()
        .enumerate()
        .map(|(k, symbol)| {
            let r = spacing * (k as f32).sqrt();
            let a = k as f32 * GOLDEN_ANGLE;
            store.add_node(symbol, anchor + vec2(a.cos(), a.sin()) * r).id
        })
        .collect()
}
