use crate::constants::*;
use crate::input::Viewport;
use reso_core::{FrameView, Node, NodeId};
use std::f64::consts::TAU;
use std::time::Duration;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
fn rgba(rgb: [f32; 3], alpha: f32) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (rgb[0] * 255.0).round() as u8,
        (rgb[1] * 255.0).round() as u8,
        (rgb[2] * 255.0).round() as u8,
        alpha.clamp(0.0, 1.0)
    )
}

fn find(nodes: &[Node], id: NodeId) -> Option<&Node> {
    nodes.iter().find(|n| n.id == id)
}

pub struct CanvasRenderer {
    ctx: web::CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        Ok(Self { ctx })
    }

    pub fn draw(&self, view: &FrameView<'_>, viewport: &Viewport, now: Duration) {
        self.backdrop(view, viewport);
        self.links(view, viewport);
        self.nodes(view, viewport);
        self.tags(view, viewport, now);
    }

    /// Glow whose size follows `spread`, brightness `intensity` and flicker
    /// `noise`.
    fn backdrop(&self, view: &FrameView<'_>, viewport: &Viewport) {
        let ctx = &self.ctx;
        let (w, h) = (viewport.width as f64, viewport.height as f64);
        ctx.set_fill_style_str(&rgba(BACKGROUND_RGB, 1.0));
        ctx.fill_rect(0.0, 0.0, w, h);

        let u = view.uniforms;
        let flicker = 1.0 + 0.1 * u.noise * (u.time * 7.3).sin();
        let radius = (w.max(h) * (0.2 + 0.8 * u.spread as f64) * flicker as f64).max(1.0);
        if let Ok(gradient) = ctx.create_radial_gradient(w * 0.5, h * 0.5, 0.0, w * 0.5, h * 0.5, radius) {
            let _ = gradient.add_color_stop(0.0, &rgba(BACKDROP_GLOW_RGB, 0.6 * u.intensity));
            let _ = gradient.add_color_stop(1.0, &rgba(BACKDROP_GLOW_RGB, 0.0));
            ctx.set_fill_style_canvas_gradient(&gradient);
            ctx.fill_rect(0.0, 0.0, w, h);
        }
    }

    fn links(&self, view: &FrameView<'_>, viewport: &Viewport) {
        let ctx = &self.ctx;
        ctx.set_line_width(LINK_WIDTH_PX);
        for link in view.links {
            let (Some(a), Some(b)) = (find(view.nodes, link.source), find(view.nodes, link.target)) else {
                continue;
            };
            let pa = viewport.to_canvas(a.position);
            let pb = viewport.to_canvas(b.position);
            ctx.set_stroke_style_str(&rgba([1.0, 1.0, 1.0], LINK_ALPHA_MIN + LINK_ALPHA_SPAN * link.weight));
            ctx.begin_path();
            ctx.move_to(pa.x as f64, pa.y as f64);
            ctx.line_to(pb.x as f64, pb.y as f64);
            ctx.stroke();
        }
    }

    fn nodes(&self, view: &FrameView<'_>, viewport: &Viewport) {
        let ctx = &self.ctx;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style_str("#fff");
        for node in view.nodes {
            let p = viewport.to_canvas(node.position);
            let r = viewport.scale_len(node.radius).max(4.0);
            if view.selected == Some(node.id) || node.pinned {
                ctx.set_stroke_style_str(&rgba([1.0, 1.0, 1.0], 0.7));
                ctx.set_line_width(SELECTED_RING_PX);
                ctx.begin_path();
                let _ = ctx.arc(p.x as f64, p.y as f64, r as f64, 0.0, TAU);
                ctx.stroke();
            }
            ctx.set_font(&format!("{}px serif", (r * GLYPH_SCALE).round()));
            let _ = ctx.fill_text(&node.symbol, p.x as f64, p.y as f64);
        }
    }

    fn tags(&self, view: &FrameView<'_>, viewport: &Viewport, now: Duration) {
        let ctx = &self.ctx;
        ctx.set_font(TAG_FONT);
        for tag in view.tags {
            let age = now.saturating_sub(tag.created_at).as_secs_f32();
            let life = tag.ttl.as_secs_f32().max(1e-3);
            let remaining = 1.0 - age / life;
            let alpha = (remaining / TAG_FADE_FRACTION).clamp(0.0, 1.0);
            ctx.set_fill_style_str(&format!("rgba({TAG_RGB}, {alpha:.3})"));
            let x = viewport.width * tag.x / 100.0;
            let y = viewport.height * tag.y / 100.0;
            let _ = ctx.fill_text(&tag.text, x as f64, y as f64);
        }
    }
}
