// Canvas drawing constants

pub const BACKGROUND_RGB: [f32; 3] = [0.03, 0.04, 0.08];
pub const BACKDROP_GLOW_RGB: [f32; 3] = [0.35, 0.45, 0.95];

// Links fade from faint to solid with weight
pub const LINK_ALPHA_MIN: f32 = 0.15;
pub const LINK_ALPHA_SPAN: f32 = 0.6;
pub const LINK_WIDTH_PX: f64 = 1.5;

// Emoji glyph size relative to the node radius in pixels
pub const GLYPH_SCALE: f32 = 1.5;
pub const SELECTED_RING_PX: f64 = 3.0;

// Tags fade out over the last part of their life
pub const TAG_FONT: &str = "14px serif";
pub const TAG_FADE_FRACTION: f32 = 0.3;
pub const TAG_RGB: &str = "230, 232, 255";

// URL query parameter selecting the layout preset (`?preset=bubble`)
pub const PRESET_QUERY_KEY: &str = "preset";
