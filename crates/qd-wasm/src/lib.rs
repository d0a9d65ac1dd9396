//! Browser bridge: drives the composer from page events.
//!
//! Compiled via `wasm-pack build --target web`. The page renders the two
//! text elements inside `.canvas-container`; this crate owns gesture state,
//! positions them, and exports the composition.

mod dom;

pub use dom::{CANVAS_SELECTOR, DomGeometry, WindowListeners};

use qd_core::background::BackgroundCatalog;
use qd_core::config::EditorConfig;
use qd_core::id::ElementId;
use qd_core::model::{Color, FontFamily, QuoteDesign, TextAlign, TextStyle, clamp_font_size};
use qd_editor::{Composer, Dispatch, InputEvent, Notice};
use qd_render::PngExporter;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, TouchEvent};

struct Shared {
    composer: RefCell<Composer<DomGeometry>>,
    listeners: RefCell<Option<WindowListeners>>,
}

impl Shared {
    /// Dispatch one event and keep the window subscription in step with
    /// the gesture state.
    fn handle(&self, event: &InputEvent) -> Dispatch {
        let (result, active) = {
            let mut composer = self.composer.borrow_mut();
            let result = composer.dispatch(event);
            (result, composer.gesture_active())
        };
        self.sync_listeners(active);
        result
    }

    fn sync_listeners(&self, active: bool) {
        if let Some(listeners) = self.listeners.borrow_mut().as_mut() {
            listeners.sync(active);
        }
    }
}

/// The main WASM-facing canvas controller.
#[wasm_bindgen]
pub struct QuoteCanvas {
    shared: Rc<Shared>,
    exporter: PngExporter,
}

#[wasm_bindgen]
impl QuoteCanvas {
    /// Create a canvas controller. `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<QuoteCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let exporter = PngExporter::new(&config.export);
        let composer = Composer::new(
            DomGeometry::new(),
            QuoteDesign::default(),
            config,
            BackgroundCatalog::builtin(),
        );

        let shared = Rc::new(Shared {
            composer: RefCell::new(composer),
            listeners: RefCell::new(None),
        });
        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let listeners = WindowListeners::new(Rc::new(move |event: InputEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.handle(&event);
            }
        }));
        *shared.listeners.borrow_mut() = Some(listeners);

        Ok(Self { shared, exporter })
    }

    // ─── Gesture starts ─────────────────────────────────────────────────

    /// `mousedown` on the surface. Hit tests body vs rotation handle.
    pub fn on_mouse_down(&mut self, event: &MouseEvent) -> bool {
        let input = InputEvent::from_mouse_down(
            f64::from(event.client_x()),
            f64::from(event.client_y()),
        );
        self.start(&input, event.as_ref())
    }

    /// `touchstart` on the surface. The first touch is authoritative.
    pub fn on_touch_start(&mut self, event: &TouchEvent) -> bool {
        let touches = event.touches();
        let Some(touch) = touches.get(0) else {
            return false;
        };
        let point = (f64::from(touch.client_x()), f64::from(touch.client_y()));
        match InputEvent::from_touch_start(&[point]) {
            Some(input) => self.start(&input, event.as_ref()),
            None => false,
        }
    }

    fn start(&mut self, input: &InputEvent, origin: &web_sys::Event) -> bool {
        let result = self.shared.handle(input);
        if result.stops_propagation() {
            origin.stop_propagation();
        }
        matches!(result, Dispatch::Began { .. })
    }

    /// Release everything, e.g. when the page hides the editor.
    pub fn cancel_gesture(&mut self) {
        self.shared.handle(&InputEvent::from_touch_cancel());
    }

    pub fn gesture_active(&self) -> bool {
        self.shared.composer.borrow().gesture_active()
    }

    // ─── Commands ───────────────────────────────────────────────────────

    pub fn reset_positions(&mut self) -> bool {
        let done = self.shared.composer.borrow_mut().reset_positions();
        self.shared.sync_listeners(false);
        done
    }

    /// Rotation slider. `element` is the DOM id of the text element.
    pub fn set_rotation(&mut self, element: &str, degrees: f64) {
        self.shared
            .composer
            .borrow_mut()
            .set_rotation(ElementId::intern(element), degrees);
    }

    /// Rotation readout for the slider label, folded into `[0, 360)`.
    pub fn rotation(&self, element: &str) -> f64 {
        self.shared
            .composer
            .borrow()
            .controller(ElementId::intern(element))
            .map(|c| c.display_rotation())
            .unwrap_or(0.0)
    }

    pub fn set_quote_text(&mut self, text: &str) {
        self.edit(|d| d.quote_text = text.to_string());
    }

    pub fn set_author_name(&mut self, name: &str) {
        self.edit(|d| d.author_name = name.to_string());
    }

    pub fn set_background(&mut self, id: &str) {
        self.edit(|d| d.background = id.to_string());
    }

    /// Font family by tag (`font-serif`, `font-sans`, `font-handwriting`).
    pub fn set_font(&mut self, element: &str, tag: &str) -> bool {
        let Some(font) = FontFamily::from_tag(tag) else {
            return false;
        };
        self.edit_style(element, |s| s.font = font)
    }

    pub fn set_font_size(&mut self, element: &str, size: f32) -> bool {
        self.edit_style(element, |s| s.size = clamp_font_size(size))
    }

    /// Text color as `#RRGGBB` (or any form `Color::from_hex` accepts).
    pub fn set_color(&mut self, element: &str, hex: &str) -> bool {
        let Some(color) = Color::from_hex(hex) else {
            return false;
        };
        self.edit_style(element, |s| s.color = color)
    }

    /// Alignment by tag (`text-left`, `text-center`, `text-right`).
    pub fn set_align(&mut self, element: &str, tag: &str) -> bool {
        let Some(align) = TextAlign::from_tag(tag) else {
            return false;
        };
        self.edit_style(element, |s| s.align = align)
    }

    fn edit(&mut self, f: impl FnOnce(&mut QuoteDesign)) {
        let mut composer = self.shared.composer.borrow_mut();
        let mut design = composer.design().clone();
        f(&mut design);
        composer.update_design(design);
    }

    fn edit_style(&mut self, element: &str, f: impl FnOnce(&mut TextStyle)) -> bool {
        let id = ElementId::intern(element);
        if !(id.is_quote() || id.is_author()) {
            return false;
        }
        self.edit(|d| {
            let style = if id.is_quote() {
                &mut d.quote_style
            } else {
                &mut d.author_style
            };
            f(style);
        });
        true
    }

    /// Current design as JSON.
    pub fn design_json(&self) -> String {
        serde_json::to_string(self.shared.composer.borrow().design()).unwrap_or_default()
    }

    /// Background catalog as a JSON array of `{id, url, thumbnail, name}`.
    pub fn backgrounds_json(&self) -> String {
        let composer = self.shared.composer.borrow();
        let entries: Vec<_> = composer.catalog().iter().collect();
        serde_json::to_string(&entries).unwrap_or_default()
    }

    // ─── Export ─────────────────────────────────────────────────────────

    /// Supply the bytes of a photo background (fetched by the page).
    pub fn register_image(&mut self, href: &str, bytes: &[u8]) -> bool {
        match self.exporter.register_image(href, bytes) {
            Ok(()) => true,
            Err(e) => {
                web_sys::console::warn_1(&format!("register_image: {e}").into());
                false
            }
        }
    }

    /// Render the composition to PNG bytes, or `undefined` on failure (a
    /// notice explains why).
    pub fn export_png(&mut self) -> Option<Vec<u8>> {
        let bytes = self.shared.composer.borrow_mut().export(&self.exporter);
        if bytes.is_none() {
            web_sys::console::error_1(&"Quote Dreamer export failed".into());
        }
        bytes
    }

    /// Suggested download file name.
    pub fn file_name(&self) -> String {
        self.shared.composer.borrow().config().export.file_name.clone()
    }

    /// Pending notices as JSON: `[{"level":"success","title":"...","description":null}]`.
    pub fn take_notices(&mut self) -> String {
        let notices = self.shared.composer.borrow_mut().take_notices();
        notices_json(&notices)
    }
}

fn notices_json(notices: &[Notice]) -> String {
    let list: Vec<serde_json::Value> = notices
        .iter()
        .map(|n| {
            serde_json::json!({
                "level": n.level.as_str(),
                "title": n.title,
                "description": n.description,
            })
        })
        .collect();
    serde_json::Value::Array(list).to_string()
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Quote Dreamer WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
