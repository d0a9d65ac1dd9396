//! Draggable/rotatable element controller.
//!
//! One controller per text element. A gesture starts from a pointer-down on
//! the element body (move) or its rotation handle (rotate), is fed pointer
//! moves while active, and ends on release. Geometry is read fresh from the
//! [`SurfaceGeometry`] at gesture start and on every move; nothing is cached
//! across events except the drag offset.

use crate::arbiter::{GestureArbiter, GestureLease};
use kurbo::{Point, Vec2};
use qd_core::geometry::{
    OverflowPolicy, clamp_position, drag_candidate, drag_offset, normalize_degrees,
    rotation_degrees,
};
use qd_core::id::ElementId;
use qd_core::layout::SurfaceGeometry;
use thiserror::Error;

/// Interaction mode of one element. Dragging and rotating are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    /// Moving; `offset` is pointer minus element top-left at gesture start.
    Dragging { offset: Vec2 },
    Rotating,
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self, Self::Rotating)
    }
}

/// A committed state change produced by a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementChange {
    /// New surface-relative top-left corner.
    Moved { id: ElementId, position: Point },
    /// New rotation in degrees (raw, unwrapped).
    Rotated { id: ElementId, degrees: f64 },
}

impl ElementChange {
    pub fn id(&self) -> ElementId {
        match self {
            Self::Moved { id, .. } | Self::Rotated { id, .. } => *id,
        }
    }
}

/// Why a gesture did not start. The controller's state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GestureRejected {
    #[error("element {0} is not mounted")]
    NotMounted(ElementId),

    #[error("a gesture on {0} is already in progress")]
    Busy(ElementId),
}

pub struct ElementController {
    id: ElementId,
    position: Point,
    rotation: f64,
    state: GestureState,
    lease: Option<GestureLease>,
    arbiter: GestureArbiter,
    overflow: OverflowPolicy,
    rotation_observer: Option<Box<dyn FnMut(f64)>>,
}

impl std::fmt::Debug for ElementController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementController")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ElementController {
    pub fn new(
        id: ElementId,
        position: Point,
        arbiter: GestureArbiter,
        overflow: OverflowPolicy,
    ) -> Self {
        Self {
            id,
            position,
            rotation: 0.0,
            state: GestureState::Idle,
            lease: None,
            arbiter,
            overflow,
            rotation_observer: None,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Surface-relative top-left corner.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Rotation folded into `[0, 360)` for readouts. State keeps the raw angle.
    pub fn display_rotation(&self) -> f64 {
        normalize_degrees(self.rotation)
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Register the observer told about every rotation committed by a
    /// rotate gesture. Replaces any previous observer.
    pub fn on_rotation_change(&mut self, observer: impl FnMut(f64) + 'static) {
        self.rotation_observer = Some(Box::new(observer));
    }

    fn acquire(&mut self) -> Result<GestureLease, GestureRejected> {
        if let Some(lease) = self.lease.take() {
            // Restarting our own gesture: hand the slot over to the new one.
            return Ok(lease);
        }
        self.arbiter
            .try_acquire(self.id)
            .map_err(GestureRejected::Busy)
    }

    /// Start a move gesture with the pointer at `pointer` (viewport space).
    pub fn begin_move(
        &mut self,
        pointer: Point,
        geometry: &dyn SurfaceGeometry,
    ) -> Result<(), GestureRejected> {
        let rect = geometry
            .element_rect(self.id)
            .ok_or(GestureRejected::NotMounted(self.id))?;
        let lease = self.acquire()?;
        let offset = drag_offset(pointer, rect);

        log::debug!("{} begin move, offset ({}, {})", self.id, offset.x, offset.y);
        self.lease = Some(lease);
        self.state = GestureState::Dragging { offset };
        Ok(())
    }

    /// Start a rotate gesture. The host must not also deliver the
    /// originating event to [`begin_move`](Self::begin_move).
    pub fn begin_rotate(&mut self, geometry: &dyn SurfaceGeometry) -> Result<(), GestureRejected> {
        if geometry.element_rect(self.id).is_none() {
            return Err(GestureRejected::NotMounted(self.id));
        }
        let lease = self.acquire()?;

        log::debug!("{} begin rotate", self.id);
        self.lease = Some(lease);
        self.state = GestureState::Rotating;
        Ok(())
    }

    /// Feed a pointer move. Returns the committed change, or `None` when idle
    /// or when the surface or element has gone away (the event is dropped and
    /// the last committed state is kept).
    pub fn on_move(
        &mut self,
        pointer: Point,
        geometry: &dyn SurfaceGeometry,
    ) -> Option<ElementChange> {
        if self.state.is_idle() {
            return None;
        }
        let Some(surface) = geometry.surface_rect() else {
            log::warn!("{} move dropped: surface not mounted", self.id);
            return None;
        };
        let Some(element) = geometry.element_rect(self.id) else {
            log::warn!("{} move dropped: element not mounted", self.id);
            return None;
        };

        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging { offset } => {
                let candidate = drag_candidate(pointer, surface.origin(), offset);
                self.position =
                    clamp_position(candidate, surface.size(), element.size(), self.overflow);
                log::trace!("{} -> ({}, {})", self.id, self.position.x, self.position.y);
                Some(ElementChange::Moved {
                    id: self.id,
                    position: self.position,
                })
            }
            GestureState::Rotating => {
                self.rotation = rotation_degrees(element.center(), pointer);
                log::trace!("{} -> {}deg", self.id, self.rotation);
                if let Some(observer) = self.rotation_observer.as_mut() {
                    observer(self.rotation);
                }
                Some(ElementChange::Rotated {
                    id: self.id,
                    degrees: self.rotation,
                })
            }
        }
    }

    /// End whatever gesture is active. Idempotent.
    pub fn end_gesture(&mut self) {
        if !self.state.is_idle() {
            log::debug!("{} end gesture", self.id);
        }
        self.state = GestureState::Idle;
        self.lease = None;
    }

    /// Reposition directly (reset, restore). Does not touch rotation.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Rotation from an external control such as the style panel slider.
    /// The rotation observer is not notified; the caller is the source.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use qd_core::layout::SurfaceLayout;
    use std::cell::Cell;
    use std::rc::Rc;

    fn layout() -> SurfaceLayout {
        let mut layout = SurfaceLayout::new(Point::new(100.0, 50.0), Size::new(800.0, 600.0));
        layout.mount_at(ElementId::quote(), Point::new(40.0, 40.0), Size::new(300.0, 60.0));
        layout
    }

    fn controller(arbiter: &GestureArbiter) -> ElementController {
        ElementController::new(
            ElementId::quote(),
            Point::new(40.0, 40.0),
            arbiter.clone(),
            OverflowPolicy::PinToOrigin,
        )
    }

    #[test]
    fn move_keeps_pointer_offset() {
        let layout = layout();
        let mut c = controller(&GestureArbiter::new());

        // Element top-left is at viewport (140, 90); grab it 10,5 in.
        c.begin_move(Point::new(150.0, 95.0), &layout).unwrap();
        assert_eq!(
            c.state(),
            GestureState::Dragging {
                offset: Vec2::new(10.0, 5.0)
            }
        );

        let change = c.on_move(Point::new(250.0, 195.0), &layout).unwrap();
        assert_eq!(
            change,
            ElementChange::Moved {
                id: ElementId::quote(),
                position: Point::new(140.0, 140.0)
            }
        );
    }

    #[test]
    fn move_clamps_to_surface() {
        let layout = layout();
        let mut c = controller(&GestureArbiter::new());
        c.begin_move(Point::new(150.0, 95.0), &layout).unwrap();

        c.on_move(Point::new(-500.0, -500.0), &layout);
        assert_eq!(c.position(), Point::ZERO);

        c.on_move(Point::new(5000.0, 5000.0), &layout);
        assert_eq!(c.position(), Point::new(500.0, 540.0));
    }

    #[test]
    fn rotate_notifies_observer_and_leaves_position() {
        let layout = layout();
        let mut c = controller(&GestureArbiter::new());
        let seen = Rc::new(Cell::new(f64::NAN));
        let sink = Rc::clone(&seen);
        c.on_rotation_change(move |deg| sink.set(deg));

        c.begin_rotate(&layout).unwrap();
        // Element centre in viewport space is (290, 120); pointer straight right.
        let change = c.on_move(Point::new(400.0, 120.0), &layout).unwrap();
        assert_eq!(
            change,
            ElementChange::Rotated {
                id: ElementId::quote(),
                degrees: 90.0
            }
        );
        assert_eq!(seen.get(), 90.0);
        assert_eq!(c.position(), Point::new(40.0, 40.0));
    }

    #[test]
    fn unmounted_element_aborts_start() {
        let layout = SurfaceLayout::new(Point::ZERO, Size::new(800.0, 600.0));
        let arbiter = GestureArbiter::new();
        let mut c = controller(&arbiter);
        assert_eq!(
            c.begin_move(Point::new(1.0, 1.0), &layout),
            Err(GestureRejected::NotMounted(ElementId::quote()))
        );
        assert_eq!(
            c.begin_rotate(&layout),
            Err(GestureRejected::NotMounted(ElementId::quote()))
        );
        assert!(c.state().is_idle());
        assert!(arbiter.is_idle());
    }

    #[test]
    fn move_while_idle_is_ignored() {
        let layout = layout();
        let mut c = controller(&GestureArbiter::new());
        assert_eq!(c.on_move(Point::new(300.0, 300.0), &layout), None);
        assert_eq!(c.position(), Point::new(40.0, 40.0));
    }

    #[test]
    fn end_is_idempotent_and_releases_arbiter() {
        let layout = layout();
        let arbiter = GestureArbiter::new();
        let mut c = controller(&arbiter);
        c.begin_rotate(&layout).unwrap();
        assert_eq!(arbiter.owner(), Some(ElementId::quote()));

        c.end_gesture();
        assert!(c.state().is_idle());
        assert!(arbiter.is_idle());
        c.end_gesture();
        assert!(c.state().is_idle());
        assert!(arbiter.is_idle());
    }

    #[test]
    fn restarting_own_gesture_switches_mode() {
        let layout = layout();
        let arbiter = GestureArbiter::new();
        let mut c = controller(&arbiter);
        c.begin_rotate(&layout).unwrap();
        c.begin_move(Point::new(150.0, 95.0), &layout).unwrap();
        assert!(c.state().is_dragging());
        assert_eq!(arbiter.owner(), Some(ElementId::quote()));
    }

    #[test]
    fn display_rotation_folds_raw_angle() {
        let c = controller(&GestureArbiter::new()).with_rotation(-45.0);
        assert_eq!(c.rotation(), -45.0);
        assert!((c.display_rotation() - 315.0).abs() < 1e-9);
        let c = controller(&GestureArbiter::new()).with_rotation(405.0);
        assert!((c.display_rotation() - 45.0).abs() < 1e-9);
    }
}
