//! Text style and design state bound by the style panel.
//!
//! These are plain rendering parameters. The gesture core never interprets
//! them beyond handing them to the layout estimator and the painter.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;

/// Font size range offered by the size slider, in px.
pub const FONT_SIZE_RANGE: RangeInclusive<f32> = 16.0..=72.0;

/// Swatches offered by the text color picker.
pub const FONT_COLORS: [&str; 6] = [
    "#000000", "#FFFFFF", "#8E3B46", "#6E4C1E", "#32292F", "#4A76A8",
];

/// Shown in place of an empty quote.
pub const QUOTE_PLACEHOLDER: &str = "Enter your quote...";

/// Prefix of the rendered author line.
pub const AUTHOR_PREFIX: &str = "— ";

/// Clamp a font size into [`FONT_SIZE_RANGE`] for hosts without a range control.
pub fn clamp_font_size(size: f32) -> f32 {
    size.clamp(*FONT_SIZE_RANGE.start(), *FONT_SIZE_RANGE.end())
}

// ─── Color ──────────────────────────────────────────────────────────────

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    Some(hex_nibble(hi)? << 4 | hex_nibble(lo)?)
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let b = hex.as_bytes();
        match b.len() {
            3 | 4 => {
                let short = |c: u8| hex_nibble(c).map(|v| v * 17);
                let a = if b.len() == 4 { short(b[3])? } else { 255 };
                Some(Self::rgba(short(b[0])?, short(b[1])?, short(b[2])?, a))
            }
            6 | 8 => {
                let a = if b.len() == 8 { hex_byte(b[6], b[7])? } else { 255 };
                Some(Self::rgba(
                    hex_byte(b[0], b[1])?,
                    hex_byte(b[2], b[3])?,
                    hex_byte(b[4], b[5])?,
                    a,
                ))
            }
            _ => None,
        }
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Alpha as a 0.0..=1.0 opacity.
    pub fn alpha(&self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

// ─── Font / alignment ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    #[serde(rename = "font-serif")]
    Serif,
    #[serde(rename = "font-sans")]
    Sans,
    #[serde(rename = "font-handwriting")]
    Handwriting,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [Self::Serif, Self::Sans, Self::Handwriting];

    /// Class tag used by the page shell.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Serif => "font-serif",
            Self::Sans => "font-sans",
            Self::Handwriting => "font-handwriting",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Serif => "Serif",
            Self::Sans => "Sans",
            Self::Handwriting => "Script",
        }
    }

    /// CSS/SVG font-family stack.
    pub fn css_stack(self) -> &'static str {
        match self {
            Self::Serif => "'Playfair Display', Georgia, serif",
            Self::Sans => "Inter, 'Helvetica Neue', Arial, sans-serif",
            Self::Handwriting => "'Dancing Script', 'Brush Script MT', cursive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[serde(rename = "text-left")]
    Left,
    #[default]
    #[serde(rename = "text-center")]
    Center,
    #[serde(rename = "text-right")]
    Right,
}

impl TextAlign {
    pub const ALL: [TextAlign; 3] = [Self::Left, Self::Center, Self::Right];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Left => "text-left",
            Self::Center => "text-center",
            Self::Right => "text-right",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.tag() == tag)
    }

    /// SVG `text-anchor` value.
    pub fn anchor(self) -> &'static str {
        match self {
            Self::Left => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }
}

// ─── Styles & design ────────────────────────────────────────────────────

/// Rendering parameters for one text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font: FontFamily,
    /// Font size in px.
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub opacity: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::quote_default()
    }
}

impl TextStyle {
    pub fn quote_default() -> Self {
        Self {
            font: FontFamily::Serif,
            size: 28.0,
            color: Color::rgb(0x32, 0x29, 0x2F),
            align: TextAlign::Center,
            opacity: 1.0,
        }
    }

    pub fn author_default() -> Self {
        Self {
            size: 22.0,
            opacity: 0.85,
            ..Self::quote_default()
        }
    }
}

/// Everything the style panel and text inputs bind to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteDesign {
    pub quote_text: String,
    pub author_name: String,
    pub quote_style: TextStyle,
    pub author_style: TextStyle,
    /// Background catalog id.
    pub background: String,
    /// Rotation readouts mirrored from the gesture controllers, in degrees.
    pub quote_rotation: f64,
    pub author_rotation: f64,
}

impl Default for QuoteDesign {
    fn default() -> Self {
        Self {
            quote_text: "The world breaks everyone, and afterward, many are strong at the broken places."
                .to_string(),
            author_name: "Ernest Hemingway".to_string(),
            quote_style: TextStyle::quote_default(),
            author_style: TextStyle::author_default(),
            background: "canvas-bg-1".to_string(),
            quote_rotation: 0.0,
            author_rotation: 0.0,
        }
    }
}

impl QuoteDesign {
    /// Quote text as rendered (placeholder when empty).
    pub fn display_quote(&self) -> &str {
        if self.quote_text.is_empty() {
            QUOTE_PLACEHOLDER
        } else {
            &self.quote_text
        }
    }

    /// Author line as rendered; `None` hides the author element.
    pub fn display_author(&self) -> Option<String> {
        if self.author_name.is_empty() {
            None
        } else {
            Some(format!("{AUTHOR_PREFIX}{}", self.author_name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_forms() {
        assert_eq!(Color::from_hex("#32292F"), Some(Color::rgb(0x32, 0x29, 0x2F)));
        assert_eq!(Color::from_hex("fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#0008"), Some(Color::rgba(0, 0, 0, 0x88)));
        assert_eq!(Color::from_hex("#00000080").map(|c| c.a), Some(0x80));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn color_to_hex_is_uppercase_and_drops_opaque_alpha() {
        assert_eq!(Color::rgb(0x8e, 0x3b, 0x46).to_hex(), "#8E3B46");
        assert_eq!(Color::rgba(0, 0, 0, 0x4d).to_hex(), "#0000004D");
    }

    #[test]
    fn palette_parses() {
        for hex in FONT_COLORS {
            assert!(Color::from_hex(hex).is_some(), "{hex}");
        }
    }

    #[test]
    fn tags_roundtrip() {
        for f in FontFamily::ALL {
            assert_eq!(FontFamily::from_tag(f.tag()), Some(f));
        }
        for a in TextAlign::ALL {
            assert_eq!(TextAlign::from_tag(a.tag()), Some(a));
        }
        assert_eq!(FontFamily::from_tag("font-mono"), None);
    }

    #[test]
    fn display_rules() {
        let mut design = QuoteDesign::default();
        assert_eq!(design.display_author().as_deref(), Some("— Ernest Hemingway"));
        design.quote_text.clear();
        design.author_name.clear();
        assert_eq!(design.display_quote(), QUOTE_PLACEHOLDER);
        assert_eq!(design.display_author(), None);
    }

    #[test]
    fn design_deserializes_with_defaults() {
        let design: QuoteDesign = serde_json::from_str(
            r##"{"quote_text":"Hi","quote_style":{"font":"font-sans","color":"#FFFFFF"}}"##,
        )
        .unwrap();
        assert_eq!(design.quote_text, "Hi");
        assert_eq!(design.quote_style.font, FontFamily::Sans);
        assert_eq!(design.quote_style.color, Color::WHITE);
        assert_eq!(design.quote_style.size, 28.0);
        assert_eq!(design.background, "canvas-bg-1");
    }

    #[test]
    fn font_size_clamp() {
        assert_eq!(clamp_font_size(4.0), 16.0);
        assert_eq!(clamp_font_size(90.0), 72.0);
        assert_eq!(clamp_font_size(30.0), 30.0);
    }
}
