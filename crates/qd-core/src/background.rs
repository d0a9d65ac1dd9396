//! Background catalog and CSS background expression parsing.
//!
//! Catalog entries carry their paint as a CSS expression (`linear-gradient(...)`
//! or `url(...)`), parsed here with `winnow` 0.7. The id prefix decides
//! whether an entry is a procedural gradient or a photograph, which in turn
//! decides fit and text-shadow policy.

use crate::config::ConfigError;
use crate::model::Color;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Ids starting with this prefix are procedural gradients.
pub const GRADIENT_PREFIX: &str = "canvas-bg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Gradient,
    Photo,
}

/// How the background paint maps onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundFit {
    /// Stretch to the surface bounds.
    Fill,
    /// Scale to cover the surface, centred, cropping the overflow.
    Cover,
}

/// Parsed background paint.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundFill {
    /// CSS `linear-gradient(<angle>deg, <color>, ...)`; stops are evenly spaced.
    LinearGradient {
        angle: f64,
        stops: SmallVec<[Color; 4]>,
    },
    /// CSS `url(...)`.
    Image { href: String },
}

/// Drop shadow applied behind text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
    pub dx: f64,
    pub dy: f64,
    pub blur: f64,
    pub color: Color,
}

impl TextShadow {
    /// `0 1px 2px rgba(0,0,0,0.3)`
    pub const SUBTLE: TextShadow = TextShadow {
        dx: 0.0,
        dy: 1.0,
        blur: 2.0,
        color: Color::rgba(0, 0, 0, 77),
    };
}

/// One selectable background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub id: String,
    /// CSS gradient expression or `url(...)` image reference.
    pub url: String,
    pub thumbnail: String,
    pub name: String,
}

impl Background {
    pub fn kind(&self) -> BackgroundKind {
        if self.id.starts_with(GRADIENT_PREFIX) {
            BackgroundKind::Gradient
        } else {
            BackgroundKind::Photo
        }
    }

    pub fn fit(&self) -> BackgroundFit {
        match self.kind() {
            BackgroundKind::Gradient => BackgroundFit::Fill,
            BackgroundKind::Photo => BackgroundFit::Cover,
        }
    }

    /// Text gets a shadow only over photographs, to keep contrast.
    pub fn text_shadow(&self) -> Option<TextShadow> {
        match self.kind() {
            BackgroundKind::Gradient => None,
            BackgroundKind::Photo => Some(TextShadow::SUBTLE),
        }
    }

    pub fn fill(&self) -> Result<BackgroundFill, String> {
        parse_background_css(&self.url)
    }
}

// ─── Catalog ────────────────────────────────────────────────────────────

/// The set of backgrounds the picker offers. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundCatalog {
    entries: Vec<Background>,
}

fn entry(id: &str, url: &str, thumbnail: &str, name: &str) -> Background {
    Background {
        id: id.to_string(),
        url: url.to_string(),
        thumbnail: thumbnail.to_string(),
        name: name.to_string(),
    }
}

fn gradient(id: &str, css: &str, name: &str) -> Background {
    entry(id, css, css, name)
}

const PHOTO_HOST: &str = "https://getbookquotes.vercel.app/_next/static/media";

fn photo(id: &str, file: &str, thumbnail: &str, name: &str) -> Background {
    entry(id, &format!("url('{PHOTO_HOST}/{file}')"), thumbnail, name)
}

impl Default for BackgroundCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BackgroundCatalog {
    /// The catalog shipped with the app: five gradients, six photographs.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                gradient("canvas-bg-1", "linear-gradient(135deg, #F8F0E3, #EADDCF)", "Cream"),
                gradient("canvas-bg-2", "linear-gradient(135deg, #F8F0E3, #E6C9C9)", "Blush"),
                gradient("canvas-bg-3", "linear-gradient(135deg, #EFE7DA, #D9E4EC)", "Sky"),
                gradient("canvas-bg-4", "linear-gradient(135deg, #32292F, #4A3E48)", "Dark"),
                gradient("canvas-bg-5", "linear-gradient(135deg, #8E3B46, #A65154)", "Maroon"),
                photo("book1", "book5.4ab50fc7.jpg", "assets/backgrounds/book1.jpeg", "Vintage Book"),
                photo("book2", "book3.61b073c2.jpg", "assets/backgrounds/book2.jpg", "Dark Book"),
                photo("book3", "paper1.c5abfec9.jpg", "assets/backgrounds/book3.jpg", "Old Paper"),
                photo("book4", "book2.989d7c46.jpg", "assets/backgrounds/book4.jpg", "Book Page"),
                photo("book5", "book6.ebd676df.jpg", "assets/backgrounds/book5.jpg", "White Pages"),
                photo("book6", "book4.29dd4bfd.jpg", "assets/backgrounds/book6.jpg", "Texture"),
            ],
        }
    }

    /// Load a catalog from a JSON array of `{id, url, thumbnail, name}`.
    ///
    /// Every entry's `url` must parse; an empty catalog is rejected.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entries: Vec<Background> = serde_json::from_str(json)?;
        if entries.is_empty() {
            return Err(ConfigError::Invalid("background catalog is empty".to_string()));
        }
        for bg in &entries {
            bg.fill()
                .map_err(|e| ConfigError::Invalid(format!("background `{}`: {e}", bg.id)))?;
        }
        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&Background> {
        self.entries.iter().find(|bg| bg.id == id)
    }

    /// Look up `id`, falling back to the first entry for unknown ids.
    pub fn resolve(&self, id: &str) -> &Background {
        match self.get(id) {
            Some(bg) => bg,
            None => {
                log::warn!("unknown background `{id}`, using `{}`", self.entries[0].id);
                &self.entries[0]
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Background> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── CSS expression parser ──────────────────────────────────────────────

/// Parse a CSS background expression: `linear-gradient(...)` or `url(...)`.
pub fn parse_background_css(input: &str) -> Result<BackgroundFill, String> {
    let mut rest = input.trim();
    let fill = if rest.starts_with("linear-gradient") {
        parse_linear_gradient
            .parse_next(&mut rest)
            .map_err(|e| format!("Gradient parse error: {e}"))?
    } else {
        parse_url
            .parse_next(&mut rest)
            .map_err(|e| format!("Image parse error: {e}"))?
    };
    if !rest.trim().is_empty() {
        return Err(format!("Unexpected trailing input: `{rest}`"));
    }
    Ok(fill)
}

fn skip_space(input: &mut &str) {
    *input = input.trim_start();
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched.parse::<f64>().map_err(|_| backtrack())
}

fn parse_hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    Color::from_hex(digits).ok_or_else(backtrack)
}

fn parse_linear_gradient(input: &mut &str) -> ModalResult<BackgroundFill> {
    let _ = "linear-gradient(".parse_next(input)?;
    skip_space(input);
    let angle = parse_number.parse_next(input)?;
    let _ = "deg".parse_next(input)?;

    let mut stops = SmallVec::new();
    loop {
        skip_space(input);
        if !input.starts_with(',') {
            break;
        }
        *input = &input[1..];
        skip_space(input);
        stops.push(parse_hex_color.parse_next(input)?);
    }
    let _ = ')'.parse_next(input)?;

    if stops.len() < 2 {
        return Err(backtrack());
    }
    Ok(BackgroundFill::LinearGradient { angle, stops })
}

fn parse_url(input: &mut &str) -> ModalResult<BackgroundFill> {
    let _ = "url(".parse_next(input)?;
    skip_space(input);
    let href: &str = alt((
        delimited('\'', take_till(0.., '\''), '\''),
        delimited('"', take_till(0.., '"'), '"'),
        take_till(1.., |c: char| c == ')' || c.is_whitespace()),
    ))
    .parse_next(input)?;
    skip_space(input);
    let _ = ')'.parse_next(input)?;
    Ok(BackgroundFill::Image {
        href: href.to_string(),
    })
}
