use glam::Vec2;
use reso_core::Bounds;
use web_sys as web;

/// Maps between canvas pixels and layout coordinates.
///
/// Rect bounds stretch over the whole canvas. Disk bounds are fitted into the
/// largest centred square so bubbles stay round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub bounds: Bounds,
}

impl Viewport {
    pub fn new(width: f32, height: f32, bounds: Bounds) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            bounds,
        }
    }

    #[inline]
    fn disk_scale(&self, radius: f32) -> f32 {
        0.5 * self.width.min(self.height) / radius.max(1e-6)
    }

    pub fn to_layout(&self, px: Vec2) -> Vec2 {
        match self.bounds {
            Bounds::Rect { min, max } => {
                let uv = px / Vec2::new(self.width, self.height);
                min + uv * (max - min)
            }
            Bounds::Disk { center, radius } => {
                let mid = Vec2::new(self.width, self.height) * 0.5;
                center + (px - mid) / self.disk_scale(radius)
            }
        }
    }

    pub fn to_canvas(&self, p: Vec2) -> Vec2 {
        match self.bounds {
            Bounds::Rect { min, max } => {
                let span = (max - min).max(Vec2::splat(1e-6));
                (p - min) / span * Vec2::new(self.width, self.height)
            }
            Bounds::Disk { center, radius } => {
                let mid = Vec2::new(self.width, self.height) * 0.5;
                mid + (p - center) * self.disk_scale(radius)
            }
        }
    }

    /// Pixel length of a layout-space length (the smaller axis for rects).
    pub fn scale_len(&self, len: f32) -> f32 {
        match self.bounds {
            Bounds::Rect { min, max } => {
                let span = (max - min).max(Vec2::splat(1e-6));
                len * (self.width / span.x).min(self.height / span.y)
            }
            Bounds::Disk { radius, .. } => len * self.disk_scale(radius),
        }
    }
}

#[inline]
pub fn pointer_canvas_px(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let w = rect.width() as f32;
    let h = rect.height() as f32;
    if w > 0.0 && h > 0.0 {
        Vec2::new(
            x_css / w * canvas.width() as f32,
            y_css / h * canvas.height() as f32,
        )
    } else {
        Vec2::ZERO
    }
}
