//! Input abstraction layer.
//!
//! Normalizes mouse and touch events into a unified `InputEvent` consumed
//! by the composer. Only single-touch is supported: the first touch point
//! is authoritative and the rest are ignored.

use kurbo::Point;

/// Device that produced an event. Carried for logging only; gesture math
/// never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// A normalized pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse down / touch start.
    PointerDown {
        x: f64,
        y: f64,
        source: PointerSource,
    },

    /// Mouse move / touch move.
    PointerMove {
        x: f64,
        y: f64,
        source: PointerSource,
    },

    /// Mouse up / touch end.
    PointerUp { source: PointerSource },

    /// Touch cancelled by the platform. Ends a gesture like `PointerUp`.
    PointerCancel,
}

impl InputEvent {
    pub fn from_mouse_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    pub fn from_mouse_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    pub fn from_mouse_up() -> Self {
        Self::PointerUp {
            source: PointerSource::Mouse,
        }
    }

    /// `None` when the touch list is empty.
    pub fn from_touch_start(touches: &[(f64, f64)]) -> Option<Self> {
        let &(x, y) = touches.first()?;
        Some(Self::PointerDown {
            x,
            y,
            source: PointerSource::Touch,
        })
    }

    /// `None` when the touch list is empty.
    pub fn from_touch_move(touches: &[(f64, f64)]) -> Option<Self> {
        let &(x, y) = touches.first()?;
        Some(Self::PointerMove {
            x,
            y,
            source: PointerSource::Touch,
        })
    }

    pub fn from_touch_end() -> Self {
        Self::PointerUp {
            source: PointerSource::Touch,
        }
    }

    pub fn from_touch_cancel() -> Self {
        Self::PointerCancel
    }

    /// Extract position if this event carries one.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y, .. } => {
                Some(Point::new(*x, *y))
            }
            Self::PointerUp { .. } | Self::PointerCancel => None,
        }
    }

    pub fn source(&self) -> Option<PointerSource> {
        match self {
            Self::PointerDown { source, .. }
            | Self::PointerMove { source, .. }
            | Self::PointerUp { source } => Some(*source),
            Self::PointerCancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_touch_is_authoritative() {
        let event = InputEvent::from_touch_move(&[(10.0, 20.0), (300.0, 400.0)]).unwrap();
        assert_eq!(event.position(), Some(Point::new(10.0, 20.0)));
        assert_eq!(event.source(), Some(PointerSource::Touch));
    }

    #[test]
    fn empty_touch_list_yields_nothing() {
        assert_eq!(InputEvent::from_touch_start(&[]), None);
        assert_eq!(InputEvent::from_touch_move(&[]), None);
    }

    #[test]
    fn release_has_no_position() {
        assert_eq!(InputEvent::from_mouse_up().position(), None);
        assert_eq!(InputEvent::from_touch_cancel().position(), None);
        assert_eq!(
            InputEvent::from_mouse_down(1.0, 2.0).position(),
            Some(Point::new(1.0, 2.0))
        );
    }
}
