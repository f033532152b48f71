use crate::dom;
use crate::input::Viewport;
use crate::overlay::PickerOverlay;
use crate::render::CanvasRenderer;
use crate::storage::LocalStorage;
use reso_core::{ConstellationStore, Mode, Sketch};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Everything the event handlers and the frame loop share.
pub struct App {
    pub sketch: Sketch,
    pub renderer: CanvasRenderer,
    pub viewport: Viewport,
    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,
    pub saved: ConstellationStore<LocalStorage>,
    pub overlay: PickerOverlay,
}

pub type SharedApp = Rc<RefCell<App>>;

impl App {
    /// Run one frame and draw it.
    pub fn frame(&mut self) {
        dom::sync_canvas_backing_size(&self.canvas);
        let dpr = web::window().map(|w| w.device_pixel_ratio() as f32).unwrap_or(1.0);
        self.viewport = Viewport::new(
            self.canvas.width() as f32,
            self.canvas.height() as f32,
            self.viewport.bounds,
        );
        self.sketch.set_viewport(self.viewport.width, self.viewport.height);

        let now = self.sketch.elapsed();
        let App {
            sketch,
            renderer,
            viewport,
            document,
            overlay,
            ..
        } = self;
        if let Some(view) = sketch.frame_at(now) {
            renderer.draw(&view, viewport, now);
            overlay.sync(document, view.picker, viewport, dpr);
            let status = match view.mode {
                Mode::Play => format!("loop {}s · level {:.2}", view.params.loop_seconds, view.level),
                Mode::Stop => format!("{} nodes · {} links", view.nodes.len(), view.links.len()),
            };
            dom::set_text(document, "status", &status);
        }
    }
}

/// Owns the requestAnimationFrame chain.
pub struct FrameLoop {
    running: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn start(app: SharedApp) -> Self {
        let running = Rc::new(Cell::new(true));
        let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let tick_clone = tick.clone();
        let running_tick = running.clone();
        let raf_tick = raf_id.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            raf_tick.set(None);
            if !running_tick.get() {
                return;
            }
            app.borrow_mut().frame();
            raf_tick.set(request_frame(&tick_clone));
        }) as Box<dyn FnMut()>));
        raf_id.set(request_frame(&tick));
        Self { running, raf_id }
    }

    /// Cancel the pending frame. Further calls do nothing.
    pub fn stop(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let (Some(id), Some(w)) = (self.raf_id.take(), web::window()) {
            let _ = w.cancel_animation_frame(id);
        }
    }
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) -> Option<i32> {
    let w = web::window()?;
    let borrowed = tick.borrow();
    let closure = borrowed.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}
