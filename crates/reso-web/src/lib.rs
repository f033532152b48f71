#![cfg(target_arch = "wasm32")]
pub mod audio;
pub mod constants;
pub mod dom;
pub mod frame;
pub mod input;
pub mod overlay;
pub mod render;
pub mod storage;

use frame::{App, FrameLoop, SharedApp};
use input::Viewport;
use reso_core::{AudioStatus, ConstellationStore, Mode, PointerId, Sketch, SketchConfig};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("reso-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

fn preset_from_query(window: &web::Window) -> SketchConfig {
    let search = window.location().search().unwrap_or_default();
    let wanted = format!("{}=bubble", constants::PRESET_QUERY_KEY);
    if search.trim_start_matches('?').split('&').any(|kv| kv == wanted) {
        SketchConfig::bubble()
    } else {
        SketchConfig::planar()
    }
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("app-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #app-canvas"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    dom::sync_canvas_backing_size(&canvas);

    let config = preset_from_query(&window);
    let bounds = config.physics.bounds;
    let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let app: SharedApp = Rc::new(RefCell::new(App {
        sketch: Sketch::new(config, seed),
        renderer: render::CanvasRenderer::new(&canvas)?,
        viewport: Viewport::new(canvas.width() as f32, canvas.height() as f32, bounds),
        canvas: canvas.clone(),
        document: document.clone(),
        saved: ConstellationStore::new(storage::LocalStorage),
        overlay: overlay::PickerOverlay::default(),
    }));

    wire_pointer(&canvas, &app)?;
    wire_controls(&document, &app)?;

    let frame_loop = Rc::new(FrameLoop::start(app.clone()));
    {
        let app = app.clone();
        let frame_loop = frame_loop.clone();
        let closure = Closure::wrap(Box::new(move || {
            frame_loop.stop();
            app.borrow_mut().sketch.teardown();
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        closure.forget();
    }
    Ok(())
}

fn wire_pointer(canvas: &web::HtmlCanvasElement, app: &SharedApp) -> anyhow::Result<()> {
    for (event, kind) in [
        ("pointerdown", 0u8),
        ("pointermove", 1),
        ("pointerup", 2),
        ("pointercancel", 3),
    ] {
        let app = app.clone();
        let canvas_ev = canvas.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let Ok(mut guard) = app.try_borrow_mut() else {
                return;
            };
            let app = &mut *guard;
            let px = input::pointer_canvas_px(&ev, &canvas_ev);
            let point = app.viewport.to_layout(px);
            let pointer: PointerId = ev.pointer_id();
            let now = app.sketch.elapsed();
            match kind {
                0 => {
                    let _ = canvas_ev.set_pointer_capture(pointer);
                    app.sketch.pointer_down(pointer, point, now);
                }
                1 => {
                    app.sketch.pointer_move(pointer, point, now);
                }
                2 => {
                    app.sketch.pointer_up(pointer, point, now);
                }
                _ => app.sketch.pointer_cancel(pointer),
            }
            ev.prevent_default();
        }) as Box<dyn FnMut(web::PointerEvent)>);
        canvas
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        closure.forget();
    }
    Ok(())
}

fn wire_controls(document: &web::Document, app: &SharedApp) -> anyhow::Result<()> {
    {
        let app = app.clone();
        overlay::build(document, move |symbol| {
            app.borrow_mut().sketch.toggle_picker_symbol(symbol);
        })?;
    }
    {
        let app = app.clone();
        dom::add_click_listener(document, "picker-add", move || {
            let mut app = app.borrow_mut();
            let now = app.sketch.elapsed();
            app.sketch.commit_picker(now);
        });
    }
    {
        let app = app.clone();
        dom::add_click_listener(document, "picker-close", move || {
            app.borrow_mut().sketch.close_picker();
        });
    }
    {
        let app = app.clone();
        dom::add_click_listener(document, "mode-toggle", move || toggle_mode(&app));
    }
    {
        let app = app.clone();
        dom::add_click_listener(document, "save", move || {
            let mut guard = app.borrow_mut();
            let App { sketch, saved, .. } = &mut *guard;
            if let Some(summary) = sketch.save(saved, dom::now_epoch_ms()) {
                log::info!("saved {} ({} nodes)", summary.id, summary.count);
            }
        });
    }
    {
        let app = app.clone();
        dom::add_click_listener(document, "load-latest", move || {
            let mut guard = app.borrow_mut();
            let App { sketch, saved, .. } = &mut *guard;
            match saved.list().first() {
                Some(latest) => {
                    sketch.load(saved, &latest.id);
                }
                None => log::info!("no saved constellations"),
            }
        });
    }
    Ok(())
}

fn toggle_mode(app: &SharedApp) {
    let (next, wants_audio) = {
        let mut app = app.borrow_mut();
        let next = match app.sketch.mode() {
            Mode::Stop => Mode::Play,
            Mode::Play => Mode::Stop,
        };
        let wants_audio = app.sketch.set_mode(next);
        let label = if next == Mode::Play { "stop" } else { "play" };
        dom::set_text(&app.document, "mode-toggle", label);
        (next, wants_audio)
    };
    log::info!("[mode] {:?}", next);
    if !wants_audio {
        return;
    }
    let app = app.clone();
    spawn_local(async move {
        let result = audio::request_microphone().await;
        let mut app = app.borrow_mut();
        match result {
            Ok(mic) => {
                app.sketch.audio_ready(Box::new(mic));
            }
            Err(e) => app.sketch.audio_failed(&e.to_string()),
        }
        let listening = app.sketch.audio_status() == AudioStatus::Live;
        dom::set_visible(&app.document, "mic-indicator", listening);
    });
}
