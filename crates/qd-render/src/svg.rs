//! Scene → standalone SVG document.
//!
//! The SVG is the interchange format for export: `resvg` rasterizes it, and
//! the same string can be saved directly for vector output.

use crate::paint::{Scene, TextRun};
use qd_core::background::{BackgroundFill, BackgroundFit, TextShadow};
use qd_core::layout::LINE_HEIGHT_EM;
use qd_core::model::{Color, TextAlign};
use std::fmt::Write;

/// Distance from the top of the glyph box to the baseline, in em.
const BASELINE_EM: f64 = 0.85;

fn rgb_hex(c: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Gradient vector in `objectBoundingBox` units for a CSS angle
/// (0deg points up, angles turn clockwise).
fn gradient_vector(angle: f64) -> (f64, f64, f64, f64) {
    let (sin, cos) = angle.to_radians().sin_cos();
    (
        0.5 - 0.5 * sin,
        0.5 + 0.5 * cos,
        0.5 + 0.5 * sin,
        0.5 - 0.5 * cos,
    )
}

/// Render a scene as an SVG document.
///
/// `image_href` replaces the href of an image background (typically with a
/// `data:` URL); `None` keeps the catalog URL.
pub fn render_svg(scene: &Scene, image_href: Option<&str>) -> String {
    let (width, height) = (scene.size.width, scene.size.height);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );

    svg.push_str("<defs>\n");
    if let BackgroundFill::LinearGradient { angle, stops } = &scene.background.fill {
        let (x1, y1, x2, y2) = gradient_vector(*angle);
        let _ = writeln!(
            svg,
            "  <linearGradient id=\"bg\" x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\">"
        );
        let last = stops.len().saturating_sub(1).max(1) as f64;
        for (i, stop) in stops.iter().enumerate() {
            let _ = writeln!(
                svg,
                "    <stop offset=\"{}\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
                i as f64 / last,
                rgb_hex(*stop),
                stop.alpha()
            );
        }
        svg.push_str("  </linearGradient>\n");
    }
    if let Some(shadow) = scene.texts.iter().find_map(|t| t.shadow) {
        write_shadow_filter(&mut svg, shadow);
    }
    svg.push_str("</defs>\n");

    match &scene.background.fill {
        BackgroundFill::LinearGradient { .. } => {
            let _ = writeln!(
                svg,
                "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"url(#bg)\"/>"
            );
        }
        BackgroundFill::Image { href } => {
            let aspect = match scene.background.fit {
                BackgroundFit::Cover => "xMidYMid slice",
                BackgroundFit::Fill => "none",
            };
            let href = escape(image_href.unwrap_or(href));
            let _ = writeln!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"{aspect}\" xlink:href=\"{href}\"/>"
            );
        }
    }

    for run in &scene.texts {
        write_text(&mut svg, run);
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_shadow_filter(svg: &mut String, shadow: TextShadow) {
    let _ = writeln!(
        svg,
        "  <filter id=\"text-shadow\" x=\"-10%\" y=\"-10%\" width=\"120%\" height=\"120%\">\n    <feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" flood-opacity=\"{}\"/>\n  </filter>",
        shadow.dx,
        shadow.dy,
        shadow.blur / 2.0,
        rgb_hex(shadow.color),
        shadow.color.alpha()
    );
}

fn write_text(svg: &mut String, run: &TextRun) {
    let style = &run.style;
    let size = f64::from(style.size);
    let line_height = size * LINE_HEIGHT_EM;
    let rect = run.rect;
    let center = rect.center();
    let x = match style.align {
        TextAlign::Left => rect.x0,
        TextAlign::Center => center.x,
        TextAlign::Right => rect.x1,
    };

    let mut attrs = format!(
        "font-family=\"{}\" font-size=\"{size}\" fill=\"{}\" fill-opacity=\"{}\" opacity=\"{}\" text-anchor=\"{}\"",
        style.font.css_stack(),
        rgb_hex(style.color),
        style.color.alpha(),
        style.opacity,
        style.align.anchor()
    );
    if run.rotation != 0.0 {
        let _ = write!(
            attrs,
            " transform=\"rotate({} {} {})\"",
            run.rotation, center.x, center.y
        );
    }
    if run.shadow.is_some() {
        attrs.push_str(" filter=\"url(#text-shadow)\"");
    }

    let _ = writeln!(svg, "<text id=\"{}\" {attrs}>", escape(run.id.as_str()));
    let mut y = rect.y0 + (line_height - size) / 2.0 + size * BASELINE_EM;
    for line in &run.lines {
        let _ = writeln!(svg, "  <tspan x=\"{x}\" y=\"{y}\">{}</tspan>", escape(line));
        y += line_height;
    }
    svg.push_str("</text>\n");
}
