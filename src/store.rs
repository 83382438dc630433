//! The Canonical State Store: one immutable snapshot, swapped wholesale.

use std::sync::Arc;

use kings_shared::CanonicalState;

/// Holds the current snapshot. Readers clone the `Arc`; writers build a new
/// state and [`replace`](Store::replace) it in one step, so nobody ever
/// observes a half-applied transition.
#[derive(Clone, Debug, Default)]
pub struct Store {
    current: Arc<CanonicalState>,
}

impl Store {
    pub fn snapshot(&self) -> Arc<CanonicalState> {
        Arc::clone(&self.current)
    }

    /// Install `next` as the current snapshot.
    pub fn replace(&mut self, next: CanonicalState) {
        self.current = Arc::new(next);
    }

    /// Drop back to an empty table, e.g. after the session is lost.
    pub fn reset(&mut self) {
        self.current = Arc::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_snapshots_are_untouched_by_replace() {
        let mut store = Store::default();
        let before = store.snapshot();
        store.replace(CanonicalState {
            revision: 3,
            ..CanonicalState::default()
        });
        assert_eq!(before.revision, 0);
        assert_eq!(store.snapshot().revision, 3);
        store.reset();
        assert_eq!(*store.snapshot(), CanonicalState::default());
    }
}
