// Shared tuning constants for the graph, physics, interaction and tag layers.
// Lengths are in layout units: the planar layout spans [0,1]x[0,1], the bubble
// layout is a disk of radius BUBBLE_BOUND_RADIUS around the origin.

use std::time::Duration;

// Graph
pub const LINK_WEIGHT_MIN: f32 = 0.1;
pub const LINK_WEIGHT_MAX: f32 = 1.0;
pub const DEFAULT_LINK_WEIGHT: f32 = 0.6; // explicit connect gesture
pub const FALLBACK_WEIGHT: f32 = 0.8; // weight for symbols outside the library

// Physics
pub const MAX_STEP_SEC: f32 = 0.05; // clamp on delta time (tab resume, hitches)
pub const REFERENCE_FPS: f32 = 60.0; // friction is tuned per 60 Hz frame
pub const DISTANCE_EPSILON: f32 = 1e-4; // added to pairwise distances
pub const COLLISION_IMPULSE: f32 = 0.35; // fraction of closing speed exchanged
pub const DRAG_TIME_FLOOR_SEC: f32 = 0.016; // floor on release velocity denominator
pub const IMPULSE_STRENGTH: f32 = 0.7; // default radial tap impulse

pub const PLANAR_NODE_RADIUS: f32 = 0.03;
pub const PLANAR_REPULSION: f32 = 0.0012;
pub const PLANAR_REPULSION_SOFTENING: f32 = 0.0025;
pub const PLANAR_SPRING: f32 = 9.0;
pub const PLANAR_REST_LENGTH: f32 = 0.16;
pub const PLANAR_CENTER_PULL: f32 = 0.8;
pub const PLANAR_FRICTION: f32 = 0.9;
pub const PLANAR_RESTITUTION: f32 = 0.4;
pub const PLANAR_MAX_SPEED: f32 = 2.5;

pub const BUBBLE_BOUND_RADIUS: f32 = 1.0;
pub const BUBBLE_NODE_RADIUS: f32 = 0.12;
pub const BUBBLE_SPRING: f32 = 2.5;
pub const BUBBLE_REST_LENGTH: f32 = 0.4;
pub const BUBBLE_FRICTION: f32 = 0.98;
pub const BUBBLE_RESTITUTION: f32 = 0.85;
pub const BUBBLE_MAX_SPEED: f32 = 6.0;
pub const BUBBLE_BASE_SPEED: f32 = 0.18; // initial drift of freshly placed bubbles

// Metrics
pub const TENSION_EXTENT_FRACTION: f32 = 0.2; // mean link length reference
pub const SPREAD_EXTENT_FRACTION: f32 = 0.275; // RMS spread reference
pub const RHYTHM_REFERENCE_COUNT: f32 = 20.0;
pub const LOOP_SECONDS_MIN: f32 = 18.0;
pub const LOOP_SECONDS_SPAN: f32 = 32.0;

// Interaction
pub const TAP_SLOP_FRACTION: f32 = 0.01; // of the bound extent
pub const TAP_MAX: Duration = Duration::from_millis(300);
pub const LONG_PRESS: Duration = Duration::from_millis(550);
pub const DELETE_HOLD: Duration = Duration::from_millis(900);
pub const DELETE_CONFIRM: Duration = Duration::from_millis(600);
pub const PICK_RADIUS_SCALE: f32 = 1.2; // hit radius relative to node radius
pub const LINK_DISTANCE_FRACTION: f32 = 0.18; // proximity-link threshold of the extent
pub const PROXIMITY_WEIGHT_MIN: f32 = 0.2;
pub const PICKER_SPACING_FRACTION: f32 = 0.06; // spiral step when dropping picks

// Tags
pub const TAG_RATE_LIMIT: Duration = Duration::from_millis(700);
pub const TAG_SWEEP_INTERVAL: Duration = Duration::from_millis(400);
pub const TAG_TTL_MIN_MS: f32 = 2200.0;
pub const TAG_TTL_SPAN_MS: f32 = 1600.0;
pub const TAG_SECOND_WORD_CHANCE: f64 = 0.4;
pub const TAG_SHIFT_THRESHOLD: f32 = 0.18; // |dtension| + |dspread|
pub const TAG_SEPARATOR: &str = " · ";

// Audio
pub const IDLE_LEVEL_CENTER: f32 = 0.35;
pub const IDLE_LEVEL_SWING: f32 = 0.25;
pub const IDLE_LEVEL_HZ: f32 = 0.23;
pub const SPECTRUM_FULL_SCALE: f32 = 200.0; // mean byte bin that maps to level 1
pub const SPECTRUM_LEVEL_FLOOR: f32 = 0.05;
pub const AUDIO_PEAK_LEVEL: f32 = 0.75;
pub const AUDIO_PEAK_COOLDOWN: Duration = Duration::from_millis(1200);

// Shader uniforms
pub const UNIFORM_TIME_RATE_PLAY: f32 = 1.2;
pub const UNIFORM_TIME_RATE_STOP: f32 = 0.4;
pub const UNIFORM_SMOOTH_INTENSITY: f32 = 0.05; // per 60 Hz frame
pub const UNIFORM_SMOOTH_SPREAD: f32 = 0.05;
pub const UNIFORM_SMOOTH_NOISE: f32 = 0.08;
pub const UNIFORM_LEVEL_TO_INTENSITY: f32 = 0.4;
pub const UNIFORM_LEVEL_TO_SPREAD: f32 = 0.3;

// Persistence
pub const STORAGE_KEY: &str = "cosmoji-constellations";
