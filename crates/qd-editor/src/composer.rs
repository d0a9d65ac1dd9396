//! Composer: the two element controllers, their shared arbiter, and the
//! design they render.
//!
//! Hosts feed normalized [`InputEvent`]s to [`Composer::dispatch`] (or call
//! the per-element entry points when their toolkit already knows which
//! affordance was pressed) and drain [`Notice`]s for display.

use crate::arbiter::GestureArbiter;
use crate::gesture::{ElementChange, ElementController, GestureRejected};
use crate::input::InputEvent;
use crate::notify::{self, Notice, Notices};
use kurbo::{Point, Rect};
use qd_core::background::BackgroundCatalog;
use qd_core::config::EditorConfig;
use qd_core::geometry::clamp_position;
use qd_core::id::ElementId;
use qd_core::layout::{ElementFrame, SurfaceGeometry, centered_position};
use qd_core::model::QuoteDesign;
use qd_render::{Exporter, HitPart, build_scene, hit_test};
use smallvec::SmallVec;
use std::cell::Cell;
use std::rc::Rc;

/// Outcome of dispatching one input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    /// Nothing to do (bare background, idle move, stray release).
    Ignored,
    /// A gesture started on `element`.
    Began { element: ElementId, part: HitPart },
    /// A gesture start was refused; state is unchanged.
    Rejected(GestureRejected),
    Changed(ElementChange),
    /// The active gesture on `element` ended.
    Ended(ElementId),
}

impl Dispatch {
    /// A rotate start must not reach ancestor handlers (which would start
    /// a move from the same event).
    pub fn stops_propagation(&self) -> bool {
        matches!(
            self,
            Self::Began {
                part: HitPart::RotateHandle,
                ..
            }
        )
    }
}

pub struct Composer<G: SurfaceGeometry> {
    geometry: G,
    arbiter: GestureArbiter,
    quote: ElementController,
    author: ElementController,
    quote_readout: Rc<Cell<f64>>,
    author_readout: Rc<Cell<f64>>,
    design: QuoteDesign,
    config: EditorConfig,
    catalog: BackgroundCatalog,
    notices: Notices,
}

impl<G: SurfaceGeometry> Composer<G> {
    pub fn new(
        mut geometry: G,
        design: QuoteDesign,
        config: EditorConfig,
        catalog: BackgroundCatalog,
    ) -> Self {
        let arbiter = GestureArbiter::new();
        let mut quote = ElementController::new(
            ElementId::quote(),
            config.quote_start,
            arbiter.clone(),
            config.overflow,
        )
        .with_rotation(design.quote_rotation);
        let mut author = ElementController::new(
            ElementId::author(),
            config.author_start,
            arbiter.clone(),
            config.overflow,
        )
        .with_rotation(design.author_rotation);

        let quote_readout = Rc::new(Cell::new(design.quote_rotation));
        let author_readout = Rc::new(Cell::new(design.author_rotation));
        let sink = Rc::clone(&quote_readout);
        quote.on_rotation_change(move |deg| sink.set(deg));
        let sink = Rc::clone(&author_readout);
        author.on_rotation_change(move |deg| sink.set(deg));

        geometry.content_changed(&design);
        geometry.element_placed(quote.id(), quote.position(), quote.rotation());
        geometry.element_placed(author.id(), author.position(), author.rotation());

        let mut notices = Notices::default();
        notices.push(
            Notice::info(notify::WELCOME_TITLE).with_description(notify::WELCOME_DESCRIPTION),
        );

        Self {
            geometry,
            arbiter,
            quote,
            author,
            quote_readout,
            author_readout,
            design,
            config,
            catalog,
            notices,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    pub fn design(&self) -> &QuoteDesign {
        &self.design
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &BackgroundCatalog {
        &self.catalog
    }

    pub fn controller(&self, id: ElementId) -> Option<&ElementController> {
        if id.is_quote() {
            Some(&self.quote)
        } else if id.is_author() {
            Some(&self.author)
        } else {
            None
        }
    }

    /// Element that owns the active gesture, if any. Hosts keep their global
    /// move/up listeners attached exactly while this is `Some`.
    pub fn active_element(&self) -> Option<ElementId> {
        self.arbiter.owner()
    }

    pub fn gesture_active(&self) -> bool {
        !self.arbiter.is_idle()
    }

    /// Take every pending notice, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Surface-local frames of mounted elements, in paint order.
    pub fn frames(&self) -> SmallVec<[ElementFrame; 2]> {
        let mut frames = SmallVec::new();
        for controller in [&self.quote, &self.author] {
            if let Some(rect) = self.geometry.element_rect(controller.id()) {
                frames.push(ElementFrame {
                    id: controller.id(),
                    rect: Rect::from_origin_size(controller.position(), rect.size()),
                    rotation: controller.rotation(),
                });
            }
        }
        frames
    }

    // ─── Gestures ───────────────────────────────────────────────────────

    /// Route one normalized event.
    ///
    /// Pointer-down is hit tested against the rotation handles and bodies;
    /// moves and releases go only to the element that owns the gesture.
    pub fn dispatch(&mut self, event: &InputEvent) -> Dispatch {
        match *event {
            InputEvent::PointerDown { x, y, .. } => self.pointer_down(Point::new(x, y)),
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(x, y)),
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => self.pointer_up(),
        }
    }

    fn pointer_down(&mut self, pointer: Point) -> Dispatch {
        let Some(surface) = self.geometry.surface_rect() else {
            return Dispatch::Ignored;
        };
        let local = pointer - surface.origin().to_vec2();
        match hit_test(&self.frames(), self.config.rotation_handle, local) {
            Some(hit) => match hit.part {
                HitPart::Body => self.begin_move(hit.element, pointer),
                HitPart::RotateHandle => self.begin_rotate(hit.element),
            },
            None => Dispatch::Ignored,
        }
    }

    /// Start moving `id` with the pointer at `pointer` (viewport space).
    pub fn begin_move(&mut self, id: ElementId, pointer: Point) -> Dispatch {
        let Some(controller) = Self::pick(&mut self.quote, &mut self.author, id) else {
            return Dispatch::Ignored;
        };
        match controller.begin_move(pointer, &self.geometry) {
            Ok(()) => Dispatch::Began {
                element: id,
                part: HitPart::Body,
            },
            Err(rejected) => {
                log::debug!("move start rejected: {rejected}");
                Dispatch::Rejected(rejected)
            }
        }
    }

    /// Start rotating `id`.
    pub fn begin_rotate(&mut self, id: ElementId) -> Dispatch {
        let Some(controller) = Self::pick(&mut self.quote, &mut self.author, id) else {
            return Dispatch::Ignored;
        };
        match controller.begin_rotate(&self.geometry) {
            Ok(()) => Dispatch::Began {
                element: id,
                part: HitPart::RotateHandle,
            },
            Err(rejected) => {
                log::debug!("rotate start rejected: {rejected}");
                Dispatch::Rejected(rejected)
            }
        }
    }

    fn pointer_move(&mut self, pointer: Point) -> Dispatch {
        let Some(owner) = self.arbiter.owner() else {
            return Dispatch::Ignored;
        };
        let Some(controller) = Self::pick(&mut self.quote, &mut self.author, owner) else {
            return Dispatch::Ignored;
        };
        let Some(change) = controller.on_move(pointer, &self.geometry) else {
            return Dispatch::Ignored;
        };
        let (position, rotation) = (controller.position(), controller.rotation());
        self.geometry.element_placed(owner, position, rotation);
        self.sync_readouts();
        Dispatch::Changed(change)
    }

    fn pointer_up(&mut self) -> Dispatch {
        let Some(owner) = self.arbiter.owner() else {
            return Dispatch::Ignored;
        };
        match Self::pick(&mut self.quote, &mut self.author, owner) {
            Some(controller) => {
                controller.end_gesture();
                Dispatch::Ended(owner)
            }
            None => Dispatch::Ignored,
        }
    }

    /// End any active gesture on either element.
    pub fn end_gestures(&mut self) {
        self.quote.end_gesture();
        self.author.end_gesture();
    }

    fn pick<'a>(
        quote: &'a mut ElementController,
        author: &'a mut ElementController,
        id: ElementId,
    ) -> Option<&'a mut ElementController> {
        if id.is_quote() {
            Some(quote)
        } else if id.is_author() {
            Some(author)
        } else {
            None
        }
    }

    fn sync_readouts(&mut self) {
        self.design.quote_rotation = self.quote_readout.get();
        self.design.author_rotation = self.author_readout.get();
    }

    // ─── Commands ───────────────────────────────────────────────────────

    /// Centre both elements horizontally: the quote `reset_vertical_offset`
    /// above the surface's vertical centre, the author the same distance
    /// below. Uses current rendered sizes; rotation is untouched. Returns
    /// `false` when the surface is not mounted.
    pub fn reset_positions(&mut self) -> bool {
        self.end_gestures();
        let Some(surface) = self.geometry.surface_rect() else {
            log::warn!("reset skipped: surface not mounted");
            return false;
        };
        let dy = self.config.reset_vertical_offset;
        for (id, offset) in [(ElementId::quote(), -dy), (ElementId::author(), dy)] {
            let Some(element) = self.geometry.element_rect(id) else {
                continue;
            };
            let Some(controller) = Self::pick(&mut self.quote, &mut self.author, id) else {
                continue;
            };
            let centred = centered_position(surface.size(), element.size(), offset);
            let position = clamp_position(
                centred,
                surface.size(),
                element.size(),
                controller.overflow(),
            );
            controller.set_position(position);
            let rotation = controller.rotation();
            self.geometry.element_placed(id, position, rotation);
        }
        self.notices.push(Notice::success(notify::RESET_DONE));
        true
    }

    /// Place an element directly (restoring a saved layout, CLI input).
    pub fn set_position(&mut self, id: ElementId, position: Point) {
        if let Some(controller) = Self::pick(&mut self.quote, &mut self.author, id) {
            controller.set_position(position);
            let rotation = controller.rotation();
            self.geometry.element_placed(id, position, rotation);
        }
    }

    /// Rotation from the style panel slider.
    pub fn set_rotation(&mut self, id: ElementId, degrees: f64) {
        let Some(controller) = Self::pick(&mut self.quote, &mut self.author, id) else {
            return;
        };
        controller.set_rotation(degrees);
        let position = controller.position();
        self.geometry.element_placed(id, position, degrees);
        if id.is_quote() {
            self.quote_readout.set(degrees);
        } else {
            self.author_readout.set(degrees);
        }
        self.sync_readouts();
    }

    /// Replace text and style. Rotation readouts stay owned by the
    /// controllers.
    pub fn update_design(&mut self, design: QuoteDesign) {
        self.design = QuoteDesign {
            quote_rotation: self.quote.rotation(),
            author_rotation: self.author.rotation(),
            ..design
        };
        self.geometry.content_changed(&self.design);
        // Re-measured or re-mounted boxes take the controllers' placement.
        for controller in [&self.quote, &self.author] {
            self.geometry
                .element_placed(controller.id(), controller.position(), controller.rotation());
        }
    }

    /// Export the current composition. Failures become a notice; gesture
    /// and position state are never touched.
    pub fn export(&mut self, exporter: &dyn Exporter) -> Option<Vec<u8>> {
        let result = match self.geometry.surface_rect() {
            Some(surface) => {
                build_scene(&self.design, &self.catalog, &self.frames(), surface.size())
                    .and_then(|scene| exporter.export(&scene).map_err(|e| e.to_string()))
            }
            None => Err("surface not mounted".to_string()),
        };
        match result {
            Ok(bytes) => {
                self.notices.push(Notice::success(notify::EXPORT_DONE));
                Some(bytes)
            }
            Err(e) => {
                log::error!("export failed: {e}");
                self.notices.push(Notice::error(notify::EXPORT_FAILED).with_description(e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use qd_core::layout::SurfaceLayout;

    fn composer() -> Composer<SurfaceLayout> {
        Composer::new(
            SurfaceLayout::new(Point::new(20.0, 10.0), Size::new(800.0, 600.0)),
            QuoteDesign::default(),
            EditorConfig::default(),
            BackgroundCatalog::builtin(),
        )
    }

    #[test]
    fn starts_with_welcome_notice_and_configured_positions() {
        let mut c = composer();
        let notices = c.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, notify::WELCOME_TITLE);
        assert_eq!(
            c.geometry().element(ElementId::quote()).map(|b| b.position),
            Some(Point::new(40.0, 40.0))
        );
        assert_eq!(c.frames().len(), 2);
    }

    #[test]
    fn rotate_start_stops_propagation() {
        let mut c = composer();
        let quote = c.frames()[0];
        // Handle centre in viewport space.
        let handle = c.config().rotation_handle.center(quote.rect) + kurbo::Vec2::new(20.0, 10.0);
        let result = c.dispatch(&InputEvent::from_mouse_down(handle.x, handle.y));
        assert!(result.stops_propagation());
        assert!(
            c.controller(ElementId::quote())
                .is_some_and(|q| q.state().is_rotating())
        );
    }

    #[test]
    fn press_on_background_is_ignored() {
        let mut c = composer();
        assert_eq!(
            c.dispatch(&InputEvent::from_mouse_down(790.0, 590.0)),
            Dispatch::Ignored
        );
        assert!(!c.gesture_active());
    }

    #[test]
    fn slider_rotation_updates_readout() {
        let mut c = composer();
        c.set_rotation(ElementId::author(), -15.0);
        assert_eq!(c.design().author_rotation, -15.0);
        assert_eq!(c.controller(ElementId::author()).map(|a| a.rotation()), Some(-15.0));
    }
}
