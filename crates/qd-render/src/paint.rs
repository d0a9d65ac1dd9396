//! Composition → display list.
//!
//! Flattens the design, the background catalog entry, and the element
//! frames into a [`Scene`] that export backends consume. Nothing here reads
//! gesture state; frames already carry committed positions and rotations.

use kurbo::{Rect, Size};
use qd_core::background::{BackgroundCatalog, BackgroundFill, BackgroundFit, TextShadow};
use qd_core::id::ElementId;
use qd_core::layout::{ElementFrame, QUOTE_MAX_WIDTH_RATIO, wrap_lines};
use qd_core::model::{QuoteDesign, TextStyle};

/// Background layer of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundLayer {
    /// Catalog id the paint came from.
    pub id: String,
    pub fill: BackgroundFill,
    pub fit: BackgroundFit,
}

/// One positioned block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub id: ElementId,
    pub lines: Vec<String>,
    /// Surface-local, untransformed box.
    pub rect: Rect,
    /// Degrees, clockwise, about `rect`'s centre.
    pub rotation: f64,
    pub style: TextStyle,
    pub shadow: Option<TextShadow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub background: BackgroundLayer,
    /// Paint order: first is bottom-most.
    pub texts: Vec<TextRun>,
}

/// Build the display list for the current composition.
///
/// Frames for elements the design hides (an empty author line) are skipped.
pub fn build_scene(
    design: &QuoteDesign,
    catalog: &BackgroundCatalog,
    frames: &[ElementFrame],
    surface: Size,
) -> Result<Scene, String> {
    let bg = catalog.resolve(&design.background);
    let background = BackgroundLayer {
        id: bg.id.clone(),
        fill: bg.fill()?,
        fit: bg.fit(),
    };
    let shadow = bg.text_shadow();

    let mut texts = Vec::with_capacity(frames.len());
    for frame in frames {
        let (text, style, max_width) = if frame.id.is_quote() {
            (
                design.display_quote().to_string(),
                &design.quote_style,
                Some(surface.width * QUOTE_MAX_WIDTH_RATIO),
            )
        } else if frame.id.is_author() {
            match design.display_author() {
                Some(author) => (author, &design.author_style, None),
                None => continue,
            }
        } else {
            log::warn!("no text bound to element {}", frame.id);
            continue;
        };

        let lines = wrap_lines(&text, f64::from(style.size), max_width);
        log::trace!(
            "TEXT {} {} line(s) at ({}, {}) rot {}",
            frame.id,
            lines.len(),
            frame.rect.x0,
            frame.rect.y0,
            frame.rotation
        );
        texts.push(TextRun {
            id: frame.id,
            lines,
            rect: frame.rect,
            rotation: frame.rotation,
            style: style.clone(),
            shadow,
        });
    }

    Ok(Scene {
        size: surface,
        background,
        texts,
    })
}
