// Tab registry - the ids this page currently renders.
// An id is a member iff a row exists for it; all mutation goes through add/remove/replace.

use crate::errors::DiscardError;
use crate::state::TabId;

#[derive(Debug, Default, Clone)]
pub struct TabRegistry {
    ids: Vec<TabId>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Returns false if the id was already tracked.
    pub fn add(&mut self, tab_id: TabId) -> bool {
        if self.contains(tab_id) {
            return false;
        }
        self.ids.push(tab_id);
        true
    }

    /// Returns false if the id was not tracked.
    pub fn remove(&mut self, tab_id: TabId) -> bool {
        match self.ids.iter().position(|id| *id == tab_id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.ids.contains(&tab_id)
    }

    /// Swaps `old_id` for `new_id`. Only valid while a discard is pending.
    pub fn replace(&mut self, old_id: TabId, new_id: TabId) -> bool {
        if !self.remove(old_id) {
            return false;
        }
        self.add(new_id);
        true
    }

    pub fn ids(&self) -> &[TabId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Discard bookkeeping. A discarded tab comes back under a new id, and the
/// `Pending` state remembers the old one so the row can be carried over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DiscardState {
    #[default]
    Idle,
    Pending { previous_id: TabId },
}

impl DiscardState {
    pub fn begin(&mut self, tab_id: TabId) -> Result<(), DiscardError> {
        if let DiscardState::Pending { previous_id } = *self {
            return Err(DiscardError::AlreadyPending {
                pending: previous_id,
                requested: tab_id,
            });
        }
        *self = DiscardState::Pending { previous_id: tab_id };
        Ok(())
    }

    pub fn pending_id(&self) -> Option<TabId> {
        match *self {
            DiscardState::Pending { previous_id } => Some(previous_id),
            DiscardState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_id().is_some()
    }

    /// Returns to idle, yielding the id that was being discarded.
    pub fn finish(&mut self) -> Option<TabId> {
        std::mem::take(self).pending_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_contains() {
        let mut registry = TabRegistry::new();
        assert!(registry.add(1));
        assert!(registry.add(2));
        assert!(!registry.add(1));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(1));
        assert!(!registry.remove(1));
        assert!(!registry.contains(1));
        assert!(registry.contains(2));
    }

    #[test]
    fn test_membership_follows_created_minus_removed() {
        let mut registry = TabRegistry::new();
        let mut expected = Vec::new();
        for id in 0..20 {
            registry.add(id);
            expected.push(id);
            if id % 3 == 0 {
                registry.remove(id / 2);
                expected.retain(|x| *x != id / 2);
            }
        }
        assert_eq!(registry.ids(), expected.as_slice());
    }

    #[test]
    fn test_replace() {
        let mut registry = TabRegistry::new();
        registry.add(5);
        assert!(registry.replace(5, 9));
        assert_eq!(registry.ids(), &[9]);
        assert!(!registry.replace(5, 10));
        assert_eq!(registry.ids(), &[9]);
    }

    #[test]
    fn test_discard_state_serialises_discards() {
        let mut state = DiscardState::default();
        assert!(!state.is_pending());

        state.begin(5).unwrap();
        assert_eq!(state.pending_id(), Some(5));
        assert_eq!(
            state.begin(7),
            Err(DiscardError::AlreadyPending { pending: 5, requested: 7 })
        );
        // the failed attempt must not clobber the saved id
        assert_eq!(state.pending_id(), Some(5));

        assert_eq!(state.finish(), Some(5));
        assert_eq!(state, DiscardState::Idle);
        assert_eq!(state.finish(), None);
    }
}
