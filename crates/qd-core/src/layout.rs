//! Composition surface geometry.
//!
//! The gesture controllers never cache geometry: they ask a
//! [`SurfaceGeometry`] for the surface and element boxes on every event.
//! The browser bridge answers from the DOM; [`SurfaceLayout`] is the
//! explicit retained model used natively and in tests.

use crate::id::ElementId;
use crate::model::QuoteDesign;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Estimated glyph advance, in em.
pub const GLYPH_ADVANCE_EM: f64 = 0.5;
/// Line height, in em.
pub const LINE_HEIGHT_EM: f64 = 1.5;
/// The quote wraps at this fraction of the surface width.
pub const QUOTE_MAX_WIDTH_RATIO: f64 = 0.8;
/// Surface widths at or above this use the wide aspect ratio.
pub const WIDE_BREAKPOINT: f64 = 640.0;

/// Source of surface and element geometry, queried on demand.
pub trait SurfaceGeometry {
    /// Bounding rectangle of the surface in viewport space, or `None` when the
    /// surface is not mounted.
    fn surface_rect(&self) -> Option<Rect>;

    /// Rendered, untransformed box of an element in viewport space, or `None`
    /// when the element is not mounted.
    fn element_rect(&self, id: ElementId) -> Option<Rect>;

    /// A controller committed a new position (surface-relative) or rotation.
    /// Retained layouts mirror it here; hosts that re-render from state ignore it.
    fn element_placed(&mut self, _id: ElementId, _position: Point, _rotation: f64) {}

    /// Text or style changed; rendered sizes may differ from now on.
    fn content_changed(&mut self, _design: &QuoteDesign) {}
}

/// Rotation handle affordance: a circle centred `offset` above the
/// element's top edge midpoint, in the element's unrotated frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationHandle {
    pub offset: f64,
    pub radius: f64,
}

impl Default for RotationHandle {
    fn default() -> Self {
        Self {
            offset: 24.0,
            radius: 8.0,
        }
    }
}

impl RotationHandle {
    /// Handle centre for an element box, before rotation.
    pub fn center(&self, rect: Rect) -> Point {
        Point::new(rect.center().x, rect.y0 - self.offset)
    }
}

/// Surface-local placement of one mounted element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementFrame {
    pub id: ElementId,
    /// Untransformed box relative to the surface's top-left corner.
    pub rect: Rect,
    /// Degrees, clockwise, about the box centre.
    pub rotation: f64,
}

/// Surface size for a rendered width: 4:3 on narrow layouts, 3:2 on wide ones.
pub fn surface_size_for_width(width: f64) -> Size {
    if width < WIDE_BREAKPOINT {
        Size::new(width, width * 3.0 / 4.0)
    } else {
        Size::new(width, width * 2.0 / 3.0)
    }
}

/// Horizontally centred position, `dy` above (negative) or below the
/// surface's vertical centre.
pub fn centered_position(surface: Size, element: Size, dy: f64) -> Point {
    Point::new(
        surface.width / 2.0 - element.width / 2.0,
        surface.height / 2.0 + dy,
    )
}

// ─── Text measurement ───────────────────────────────────────────────────

/// Greedy word wrap using the estimated glyph advance.
///
/// Explicit newlines always break. A single word wider than `max_width`
/// stays on its own line.
pub fn wrap_lines(text: &str, font_size: f64, max_width: Option<f64>) -> Vec<String> {
    let advance = font_size * GLYPH_ADVANCE_EM;
    let max_chars = max_width
        .filter(|w| *w > 0.0 && advance > 0.0)
        .map(|w| ((w / advance).floor() as usize).max(1));

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let Some(limit) = max_chars else {
            lines.push(paragraph.to_string());
            continue;
        };
        let mut line = String::new();
        let mut line_chars = 0usize;
        for word in paragraph.split_whitespace() {
            let word_chars = word.chars().count();
            if line_chars > 0 && line_chars + 1 + word_chars > limit {
                lines.push(std::mem::take(&mut line));
                line_chars = 0;
            }
            if line_chars > 0 {
                line.push(' ');
                line_chars += 1;
            }
            line.push_str(word);
            line_chars += word_chars;
        }
        lines.push(line);
    }
    lines
}

/// Estimated rendered size of a block of text.
pub fn measure_text(text: &str, font_size: f64, max_width: Option<f64>) -> Size {
    let lines = wrap_lines(text, font_size, max_width);
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    Size::new(
        widest as f64 * font_size * GLYPH_ADVANCE_EM,
        lines.len() as f64 * font_size * LINE_HEIGHT_EM,
    )
}

// ─── Retained layout ────────────────────────────────────────────────────

/// Placement and rendered size of one element in a [`SurfaceLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    /// Surface-relative top-left corner.
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
}

/// Explicit layout model: the surface rectangle plus one box per mounted
/// element. Element boxes report their untransformed size, like
/// `offsetWidth`/`offsetHeight`.
#[derive(Debug, Clone)]
pub struct SurfaceLayout {
    origin: Point,
    size: Size,
    attached: bool,
    elements: HashMap<ElementId, ElementBox>,
}

impl SurfaceLayout {
    /// A surface whose top-left corner sits at `origin` in viewport space.
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            attached: true,
            elements: HashMap::new(),
        }
    }

    /// A surface sized by the responsive aspect rule.
    pub fn for_width(origin: Point, width: f64) -> Self {
        Self::new(origin, surface_size_for_width(width))
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        log::debug!("surface resized to {}x{}", size.width, size.height);
        self.size = size;
    }

    /// Take the surface out of the tree; geometry queries answer `None`.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Mount or re-measure an element, keeping its position if already mounted.
    pub fn mount(&mut self, id: ElementId, size: Size) {
        self.elements
            .entry(id)
            .and_modify(|b| b.size = size)
            .or_insert(ElementBox {
                position: Point::ZERO,
                size,
                rotation: 0.0,
            });
    }

    pub fn mount_at(&mut self, id: ElementId, position: Point, size: Size) {
        self.elements.insert(
            id,
            ElementBox {
                position,
                size,
                rotation: 0.0,
            },
        );
    }

    pub fn unmount(&mut self, id: ElementId) {
        self.elements.remove(&id);
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementBox> {
        self.elements.get(&id)
    }

    /// Re-measure both text elements from the design. The author element is
    /// unmounted while the author name is empty.
    pub fn measure_design(&mut self, design: &QuoteDesign) {
        let quote = measure_text(
            design.display_quote(),
            f64::from(design.quote_style.size),
            Some(self.size.width * QUOTE_MAX_WIDTH_RATIO),
        );
        self.mount(ElementId::quote(), quote);

        match design.display_author() {
            Some(author) => {
                let size = measure_text(&author, f64::from(design.author_style.size), None);
                self.mount(ElementId::author(), size);
            }
            None => self.unmount(ElementId::author()),
        }
    }
}

impl SurfaceGeometry for SurfaceLayout {
    fn surface_rect(&self) -> Option<Rect> {
        self.attached
            .then(|| Rect::from_origin_size(self.origin, self.size))
    }

    fn element_rect(&self, id: ElementId) -> Option<Rect> {
        if !self.attached {
            return None;
        }
        let b = self.elements.get(&id)?;
        Some(Rect::from_origin_size(
            self.origin + b.position.to_vec2(),
            b.size,
        ))
    }

    fn element_placed(&mut self, id: ElementId, position: Point, rotation: f64) {
        if let Some(b) = self.elements.get_mut(&id) {
            b.position = position;
            b.rotation = rotation;
        }
    }

    fn content_changed(&mut self, design: &QuoteDesign) {
        self.measure_design(design);
    }
}
