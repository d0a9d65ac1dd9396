//! Hit testing: surface point → element body or rotation handle.
//!
//! Walks frames topmost-first (last painted wins). The pointer is mapped
//! into each element's unrotated frame, so hits follow the rotated shape.

use kurbo::{Affine, Point};
use qd_core::id::ElementId;
use qd_core::layout::{ElementFrame, RotationHandle};

/// Which affordance of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The text body; starts a move gesture.
    Body,
    /// The handle above the text; starts a rotate gesture.
    RotateHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element: ElementId,
    pub part: HitPart,
}

/// Find the topmost affordance under `point` (surface-local coordinates).
/// Returns `None` when the point is over bare background.
pub fn hit_test(frames: &[ElementFrame], handle: RotationHandle, point: Point) -> Option<Hit> {
    for frame in frames.iter().rev() {
        let local = to_unrotated(frame, point);

        if local.distance(handle.center(frame.rect)) <= handle.radius {
            return Some(Hit {
                element: frame.id,
                part: HitPart::RotateHandle,
            });
        }
        if frame.rect.contains(local) {
            return Some(Hit {
                element: frame.id,
                part: HitPart::Body,
            });
        }
    }
    None
}

fn to_unrotated(frame: &ElementFrame, point: Point) -> Point {
    if frame.rotation == 0.0 {
        return point;
    }
    Affine::rotate_about(-frame.rotation.to_radians(), frame.rect.center()) * point
}
