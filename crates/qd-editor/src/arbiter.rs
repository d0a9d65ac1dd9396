//! Single-active-gesture token.
//!
//! Both element controllers share one [`GestureArbiter`]. Starting a gesture
//! acquires a [`GestureLease`]; the slot is released when the lease drops,
//! so every exit path (pointer up, cancel, reset, controller teardown) frees
//! it.

use qd_core::id::ElementId;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct GestureArbiter {
    owner: Rc<Cell<Option<ElementId>>>,
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `id`. Fails with the current owner if taken.
    pub fn try_acquire(&self, id: ElementId) -> Result<GestureLease, ElementId> {
        if let Some(owner) = self.owner.get() {
            return Err(owner);
        }
        self.owner.set(Some(id));
        Ok(GestureLease {
            owner: id,
            slot: Rc::clone(&self.owner),
        })
    }

    /// Element whose gesture is active, if any.
    pub fn owner(&self) -> Option<ElementId> {
        self.owner.get()
    }

    pub fn is_idle(&self) -> bool {
        self.owner.get().is_none()
    }
}

/// Proof of ownership of the gesture slot.
#[derive(Debug)]
pub struct GestureLease {
    owner: ElementId,
    slot: Rc<Cell<Option<ElementId>>>,
}

impl GestureLease {
    pub fn owner(&self) -> ElementId {
        self.owner
    }
}

impl Drop for GestureLease {
    fn drop(&mut self) {
        if self.slot.get() == Some(self.owner) {
            self.slot.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let arbiter = GestureArbiter::new();
        let lease = arbiter.try_acquire(ElementId::quote()).unwrap();
        assert_eq!(arbiter.owner(), Some(ElementId::quote()));
        assert_eq!(
            arbiter.try_acquire(ElementId::author()).unwrap_err(),
            ElementId::quote()
        );

        drop(lease);
        assert!(arbiter.is_idle());
        let lease = arbiter.try_acquire(ElementId::author()).unwrap();
        assert_eq!(lease.owner(), ElementId::author());
    }

    #[test]
    fn clones_share_the_slot() {
        let a = GestureArbiter::new();
        let b = a.clone();
        let _lease = a.try_acquire(ElementId::author()).unwrap();
        assert_eq!(b.owner(), Some(ElementId::author()));
    }
}
