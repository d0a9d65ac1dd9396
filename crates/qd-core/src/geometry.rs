//! Pointer-to-element geometry.
//!
//! Pure functions shared by the gesture controllers: drag offset capture,
//! container clamping, and the rotation-handle angle. All coordinates are
//! viewport-space unless a name says otherwise.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Added to the raw pointer angle so the handle's "up" direction reads 0°.
pub const ROTATION_HANDLE_OFFSET_DEG: f64 = 90.0;

/// What to do on an axis where the element is larger than the container
/// (the clamp interval `[0, container - element]` is inverted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Pin the element's leading edge to 0 and let it overflow the far edge.
    #[default]
    PinToOrigin,
    /// Lock the element centred over the container (negative offset).
    Center,
}

/// Offset from the element's top-left corner to the pointer.
///
/// Captured once at gesture start and held for the whole drag.
pub fn drag_offset(pointer: Point, element_rect: Rect) -> Vec2 {
    pointer - element_rect.origin()
}

/// Unclamped container-relative position that keeps `offset` under the pointer.
pub fn drag_candidate(pointer: Point, container_origin: Point, offset: Vec2) -> Point {
    pointer - container_origin.to_vec2() - offset
}

/// Clamp a single axis to `[0, container - element]`.
pub fn clamp_axis(candidate: f64, container: f64, element: f64, policy: OverflowPolicy) -> f64 {
    let max = container - element;
    if max >= 0.0 {
        candidate.max(0.0).min(max)
    } else {
        match policy {
            OverflowPolicy::PinToOrigin => 0.0,
            OverflowPolicy::Center => max / 2.0,
        }
    }
}

/// Clamp each axis of `candidate` independently so the element stays inside
/// the container.
pub fn clamp_position(
    candidate: Point,
    container: Size,
    element: Size,
    policy: OverflowPolicy,
) -> Point {
    Point::new(
        clamp_axis(candidate.x, container.width, element.width, policy),
        clamp_axis(candidate.y, container.height, element.height, policy),
    )
}

/// Rotation in degrees for a pointer orbiting `center`.
///
/// `atan2(dy, dx)` converted to degrees plus [`ROTATION_HANDLE_OFFSET_DEG`].
/// The result lies in (-90°, 270°] and is never wrapped.
pub fn rotation_degrees(center: Point, pointer: Point) -> f64 {
    let raw = (pointer.y - center.y).atan2(pointer.x - center.x);
    raw * (180.0 / std::f64::consts::PI) + ROTATION_HANDLE_OFFSET_DEG
}

/// Wrap an angle into [0, 360) for display. Committed state stays raw.
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}
