//! View lifecycle bookkeeping
//!
//! Every chart view moves through the same phases:
//! `Unmounted -> Loading -> Ready -> (Updating <-> Ready) -> Unmounted`,
//! with `Failed` as the terminal phase for a load error. Unmounting is
//! legal from any phase and must always win against in-flight work, which
//! is what [`MountToken`] and [`LoadSlot`] exist for.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Phase of a chart view's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// Not mounted; no retained drawing state, no subscriptions, no timers.
    #[default]
    Unmounted,
    /// Mounted, dataset fetch in flight.
    Loading,
    /// Dataset loaded, shapes drawn for the current selection.
    Ready,
    /// A transition between old and new shapes is running.
    Updating,
    /// The initial load failed; unrecoverable for this view instance.
    Failed,
}

impl ViewPhase {
    pub fn is_mounted(self) -> bool {
        !matches!(self, ViewPhase::Unmounted)
    }

    /// Whether the view currently has loaded data to draw
    pub fn has_data(self) -> bool {
        matches!(self, ViewPhase::Ready | ViewPhase::Updating)
    }

    /// Legality of a phase change. Unmounting is allowed from everywhere.
    pub fn can_transition_to(self, next: ViewPhase) -> bool {
        use ViewPhase::*;
        matches!(
            (self, next),
            (_, Unmounted)
                | (Unmounted, Loading)
                | (Loading, Ready)
                | (Loading, Failed)
                | (Ready, Updating)
                | (Updating, Ready)
        )
    }
}

/// Shared flag proving the owning view is still mounted.
///
/// Cloned into fetch continuations; the view revokes it on unmount so a
/// late completion can tell that its result must be discarded instead of
/// touching state that no longer exists.
#[derive(Clone)]
pub struct MountToken {
    active: Arc<AtomicBool>,
}

impl MountToken {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn revoke(&self) {
        self.active.store(false, Ordering::Relaxed);
    }
}

impl Default for MountToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-value slot a fetch task completes into and the view polls on
/// frame update. Completions never mutate view state directly.
pub struct LoadSlot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> LoadSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Store a completed result, replacing any unclaimed one
    pub fn put(&self, value: T) {
        *self.inner.lock() = Some(value);
    }

    /// Claim the completed result, if any
    pub fn take(&self) -> Option<T> {
        self.inner.lock().take()
    }
}

impl<T> Default for LoadSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for LoadSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_machine_edges() {
        use ViewPhase::*;

        assert!(Unmounted.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Ready));
        assert!(Loading.can_transition_to(Failed));
        assert!(Ready.can_transition_to(Updating));
        assert!(Updating.can_transition_to(Ready));

        // Unmount wins from every phase.
        for phase in [Unmounted, Loading, Ready, Updating, Failed] {
            assert!(phase.can_transition_to(Unmounted));
        }

        assert!(!Unmounted.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Loading));
        assert!(!Failed.can_transition_to(Ready));
        assert!(!Updating.can_transition_to(Updating));
    }

    #[test]
    fn test_phase_predicates() {
        assert!(!ViewPhase::Unmounted.is_mounted());
        assert!(ViewPhase::Loading.is_mounted());
        assert!(ViewPhase::Ready.has_data());
        assert!(ViewPhase::Updating.has_data());
        assert!(!ViewPhase::Loading.has_data());
        assert!(!ViewPhase::Failed.has_data());
    }

    #[test]
    fn test_mount_token_revocation() {
        let token = MountToken::new();
        let task_copy = token.clone();
        assert!(task_copy.is_active());

        token.revoke();
        assert!(!task_copy.is_active());
    }

    #[test]
    fn test_load_slot_put_take() {
        let slot: LoadSlot<Result<u32, String>> = LoadSlot::new();
        assert!(slot.take().is_none());

        slot.put(Ok(7));
        assert_eq!(slot.take(), Some(Ok(7)));
        assert!(slot.take().is_none());

        // A late second completion replaces an unclaimed first one.
        slot.put(Ok(1));
        slot.put(Err("stale".to_string()));
        assert_eq!(slot.take(), Some(Err("stale".to_string())));
    }
}
