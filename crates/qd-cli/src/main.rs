//! Quote Dreamer headless renderer.
//!
//! Renders a design JSON to PNG without a browser: elements are measured
//! with the layout estimator, placed from the design file (or centred like
//! the editor's reset command), and rasterized with the PNG exporter.

use kurbo::Point;
use qd_core::background::{BackgroundCatalog, BackgroundFill};
use qd_core::config::EditorConfig;
use qd_core::id::ElementId;
use qd_core::layout::SurfaceLayout;
use qd_core::model::QuoteDesign;
use qd_editor::{Composer, NoticeLevel};
use qd_render::PngExporter;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

const HELP: &str = "\
qd-cli: render a quote design to PNG

USAGE:
  qd-cli --design <design.json> --out <file.png> [OPTIONS]

OPTIONS:
  --config <config.json>       Editor configuration
  --catalog <catalog.json>     Background catalog (default: built-in)
  --background-image <file>    Image bytes for a photo background
  --width <px>                 Surface width (default: 800)
  -h, --help                   Print this help
";

struct Args {
    design: PathBuf,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
    background_image: Option<PathBuf>,
    width: f64,
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }
    Ok(Some(Args {
        design: args.value_from_str("--design")?,
        out: args.opt_value_from_str("--out")?,
        config: args.opt_value_from_str("--config")?,
        catalog: args.opt_value_from_str("--catalog")?,
        background_image: args.opt_value_from_str("--background-image")?,
        width: args.opt_value_from_str("--width")?.unwrap_or(800.0),
    }))
}

/// Surface-relative top-left corners.
#[derive(Debug, Deserialize)]
struct Positions {
    quote: Point,
    author: Point,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DesignFile {
    #[serde(flatten)]
    design: QuoteDesign,
    positions: Option<Positions>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let Some(args) = parse_args()? else {
        print!("{HELP}");
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => BackgroundCatalog::from_json(&std::fs::read_to_string(path)?)?,
        None => BackgroundCatalog::builtin(),
    };
    let file: DesignFile = serde_json::from_str(&std::fs::read_to_string(&args.design)?)?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));

    let mut exporter = PngExporter::new(&config.export);
    if let Some(path) = &args.background_image {
        let background = catalog.resolve(&file.design.background);
        match background.fill()? {
            BackgroundFill::Image { href } => {
                exporter.register_image(&href, &std::fs::read(path)?)?;
            }
            BackgroundFill::LinearGradient { .. } => {
                log::warn!(
                    "--background-image ignored: {} is a gradient",
                    background.id
                );
            }
        }
    }

    let layout = SurfaceLayout::for_width(Point::ZERO, args.width);
    let mut composer = Composer::new(layout, file.design, config, catalog);
    match &file.positions {
        Some(positions) => {
            composer.set_position(ElementId::quote(), positions.quote);
            composer.set_position(ElementId::author(), positions.author);
        }
        None => {
            composer.reset_positions();
        }
    }

    let bytes = composer.export(&exporter);
    for notice in composer.take_notices() {
        match notice.level {
            NoticeLevel::Error => log::error!(
                "{}: {}",
                notice.title,
                notice.description.as_deref().unwrap_or("")
            ),
            _ => log::info!("{}", notice.title),
        }
    }
    let Some(bytes) = bytes else {
        return Err("export failed".into());
    };
    std::fs::write(&out, bytes)?;
    let size = composer.geometry().size();
    println!(
        "wrote {} ({}x{})",
        out.display(),
        size.width.round(),
        size.height.round()
    );
    Ok(())
}
