pub mod background;
pub mod config;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;

pub use background::{
    Background, BackgroundCatalog, BackgroundFill, BackgroundFit, BackgroundKind, TextShadow,
};
pub use config::{ConfigError, EditorConfig, ExportConfig};
pub use geometry::OverflowPolicy;
pub use id::ElementId;
pub use layout::{ElementFrame, RotationHandle, SurfaceGeometry, SurfaceLayout};
pub use model::*;

// Re-export kurbo geometry so downstream crates share one version.
pub use kurbo::{Point, Rect, Size, Vec2};
