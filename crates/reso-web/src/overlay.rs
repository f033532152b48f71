//! Emoji picker panel: one button per library symbol plus add/close buttons.
//!
//! Expected markup: `#picker` containing `#picker-symbols`, `#picker-add` and
//! `#picker-close`.

use crate::input::Viewport;
use reso_core::{Picker, EMOJI_LIBRARY};
use wasm_bindgen::JsCast;
use web_sys as web;

const SELECTED_CLASS: &str = "selected";

/// Last state pushed to the DOM, so unchanged frames touch nothing.
#[derive(Default)]
pub struct PickerOverlay {
    shown: Option<(i32, i32)>,
    selected: Vec<String>,
}

/// Create the symbol buttons. `on_symbol` receives the symbol of the clicked
/// button.
pub fn build(document: &web::Document, on_symbol: impl Fn(&'static str) + Clone + 'static) -> anyhow::Result<()> {
    let container = document
        .get_element_by_id("picker-symbols")
        .ok_or_else(|| anyhow::anyhow!("missing #picker-symbols"))?;
    for entry in EMOJI_LIBRARY.iter() {
        let button = document
            .create_element("button")
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        button.set_text_content(Some(entry.symbol));
        let _ = button.set_attribute("data-symbol", entry.symbol);
        let on_symbol = on_symbol.clone();
        let symbol = entry.symbol;
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || on_symbol(symbol)) as Box<dyn FnMut()>);
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
        let _ = container.append_child(&button);
    }
    Ok(())
}

impl PickerOverlay {
    pub fn sync(&mut self, document: &web::Document, picker: Option<&Picker>, viewport: &Viewport, dpr: f32) {
        let Some(panel) = document.get_element_by_id("picker") else {
            return;
        };
        match picker {
            None => {
                if self.shown.take().is_some() {
                    let _ = panel.set_attribute("style", "display:none");
                }
            }
            Some(picker) => {
                let px = viewport.to_canvas(picker.anchor) / dpr.max(1.0);
                let at = (px.x.round() as i32, px.y.round() as i32);
                if self.shown != Some(at) {
                    let _ = panel.set_attribute("style", &format!("left:{}px;top:{}px", at.0, at.1));
                    self.shown = Some(at);
                }
                if self.selected != picker.selected {
                    mark_selected(document, &picker.selected);
                    self.selected = picker.selected.clone();
                }
            }
        }
    }
}

fn mark_selected(document: &web::Document, selected: &[String]) {
    let Ok(buttons) = document.query_selector_all("#picker-symbols button") else {
        return;
    };
    for i in 0..buttons.length() {
        let Some(el) = buttons.item(i).and_then(|n| n.dyn_into::<web::Element>().ok()) else {
            continue;
        };
        let on = el
            .get_attribute("data-symbol")
            .is_some_and(|s| selected.iter().any(|x| *x == s));
        let _ = el.class_list().toggle_with_force(SELECTED_CLASS, on);
    }
}
