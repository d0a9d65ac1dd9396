pub mod export;
pub mod hit;
pub mod paint;
pub mod svg;

pub use export::{ExportError, Exporter, PngExporter};
pub use hit::{Hit, HitPart, hit_test};
pub use paint::{BackgroundLayer, Scene, TextRun, build_scene};
pub use svg::render_svg;
