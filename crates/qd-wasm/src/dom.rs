//! DOM-backed geometry and the scoped window listener subscription.

use kurbo::{Point, Rect};
use qd_core::id::ElementId;
use qd_core::layout::SurfaceGeometry;
use qd_editor::InputEvent;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement, MouseEvent, TouchEvent, TouchList, Window};

/// Selector of the composition surface element.
pub const CANVAS_SELECTOR: &str = ".canvas-container";

fn client_rect(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.right(), r.bottom())
}

/// Geometry read live from the page on every query.
pub struct DomGeometry {
    document: Option<Document>,
}

impl Default for DomGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl DomGeometry {
    pub fn new() -> Self {
        Self {
            document: web_sys::window().and_then(|w| w.document()),
        }
    }

    fn surface(&self) -> Option<Element> {
        self.document
            .as_ref()?
            .query_selector(CANVAS_SELECTOR)
            .ok()
            .flatten()
    }

    fn element(&self, id: ElementId) -> Option<HtmlElement> {
        self.document
            .as_ref()?
            .get_element_by_id(id.as_str())?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

impl SurfaceGeometry for DomGeometry {
    fn surface_rect(&self) -> Option<Rect> {
        self.surface().map(|s| client_rect(&s))
    }

    /// Layout box before the CSS rotation: offset position inside the
    /// surface plus `offsetWidth`/`offsetHeight`.
    fn element_rect(&self, id: ElementId) -> Option<Rect> {
        let surface = self.surface_rect()?;
        let el = self.element(id)?;
        let origin = Point::new(
            surface.x0 + f64::from(el.offset_left()),
            surface.y0 + f64::from(el.offset_top()),
        );
        Some(Rect::from_origin_size(
            origin,
            (f64::from(el.offset_width()), f64::from(el.offset_height())),
        ))
    }

    fn element_placed(&mut self, id: ElementId, position: Point, rotation: f64) {
        let Some(el) = self.element(id) else {
            return;
        };
        let style = el.style();
        let result = style
            .set_property("left", &format!("{}px", position.x))
            .and_then(|_| style.set_property("top", &format!("{}px", position.y)))
            .and_then(|_| style.set_property("transform", &format!("rotate({rotation}deg)")));
        if result.is_err() {
            log::warn!("failed to style {id}");
        }
    }
}

// ─── Window listeners ───────────────────────────────────────────────────

fn first_touch(list: &TouchList) -> Vec<(f64, f64)> {
    list.get(0)
        .map(|t| (f64::from(t.client_x()), f64::from(t.client_y())))
        .into_iter()
        .collect()
}

/// Window-scoped move/up listeners for the active gesture.
///
/// The callbacks are created once and reused; `attach`/`detach` only add
/// or remove them. Dropping the subscription detaches it.
pub struct WindowListeners {
    window: Option<Window>,
    mouse_move: Closure<dyn FnMut(MouseEvent)>,
    mouse_up: Closure<dyn FnMut(MouseEvent)>,
    touch_move: Closure<dyn FnMut(TouchEvent)>,
    touch_end: Closure<dyn FnMut(TouchEvent)>,
    touch_cancel: Closure<dyn FnMut(TouchEvent)>,
    attached: bool,
}

impl WindowListeners {
    pub fn new(on_input: Rc<dyn Fn(InputEvent)>) -> Self {
        let mouse_move = {
            let on_input = Rc::clone(&on_input);
            Closure::wrap(Box::new(move |e: MouseEvent| {
                on_input(InputEvent::from_mouse_move(
                    f64::from(e.client_x()),
                    f64::from(e.client_y()),
                ));
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        let mouse_up = {
            let on_input = Rc::clone(&on_input);
            Closure::wrap(Box::new(move |_e: MouseEvent| {
                on_input(InputEvent::from_mouse_up());
            }) as Box<dyn FnMut(MouseEvent)>)
        };
        let touch_move = {
            let on_input = Rc::clone(&on_input);
            Closure::wrap(Box::new(move |e: TouchEvent| {
                if let Some(event) = InputEvent::from_touch_move(&first_touch(&e.touches())) {
                    on_input(event);
                }
            }) as Box<dyn FnMut(TouchEvent)>)
        };
        let touch_end = {
            let on_input = Rc::clone(&on_input);
            Closure::wrap(Box::new(move |_e: TouchEvent| {
                on_input(InputEvent::from_touch_end());
            }) as Box<dyn FnMut(TouchEvent)>)
        };
        let touch_cancel = Closure::wrap(Box::new(move |_e: TouchEvent| {
            on_input(InputEvent::from_touch_cancel());
        }) as Box<dyn FnMut(TouchEvent)>);

        Self {
            window: web_sys::window(),
            mouse_move,
            mouse_up,
            touch_move,
            touch_end,
            touch_cancel,
            attached: false,
        }
    }

    fn callbacks(&self) -> [(&'static str, &js_sys::Function); 5] {
        [
            ("mousemove", self.mouse_move.as_ref().unchecked_ref()),
            ("mouseup", self.mouse_up.as_ref().unchecked_ref()),
            ("touchmove", self.touch_move.as_ref().unchecked_ref()),
            ("touchend", self.touch_end.as_ref().unchecked_ref()),
            ("touchcancel", self.touch_cancel.as_ref().unchecked_ref()),
        ]
    }

    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        for (name, callback) in self.callbacks() {
            if window
                .add_event_listener_with_callback(name, callback)
                .is_err()
            {
                log::warn!("failed to add {name} listener");
            }
        }
        self.attached = true;
    }

    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        if let Some(window) = self.window.as_ref() {
            for (name, callback) in self.callbacks() {
                let _ = window.remove_event_listener_with_callback(name, callback);
            }
        }
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Attach while a gesture is active, detach otherwise.
    pub fn sync(&mut self, gesture_active: bool) {
        if gesture_active {
            self.attach();
        } else {
            self.detach();
        }
    }
}

impl Drop for WindowListeners {
    fn drop(&mut self) {
        self.detach();
    }
}
