//! Held-call side table
//!
//! Keyed by stable [`CallIdentity`] rather than by handle, so the fact that
//! a call was held (and what its original dialed number was) survives the
//! Cisco-style invalidate/recreate cycle. Entries are added only on a
//! successful hold and removed only when a call is confirmed fully ended,
//! never on transient invalidation.

use crate::domain::call::identity::CallIdentity;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
struct HeldEntry {
    original_number: Option<String>,
}

#[derive(Debug, Default)]
pub struct HeldCallTracker {
    entries: Mutex<HashMap<CallIdentity, HeldEntry>>,
}

impl HeldCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful hold for this identity.
    pub fn mark_held(&self, id: &CallIdentity, original_number: Option<String>) {
        let mut entries = self.entries.lock().unwrap();
        debug!(identity = %id, number = ?original_number, "tracker: marked held");
        entries.insert(id.clone(), HeldEntry { original_number });
    }

    pub fn was_held(&self, id: &CallIdentity) -> bool {
        self.entries.lock().unwrap().contains_key(id)
    }

    pub fn original_number_of(&self, id: &CallIdentity) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(id)
            .and_then(|e| e.original_number.clone())
    }

    /// Drop the entry for a call that is confirmed fully ended.
    pub fn forget(&self, id: &CallIdentity) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(id).is_some() {
            debug!(identity = %id, remaining = entries.len(), "tracker: forgot ended call");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CallIdentity {
        CallIdentity::resolve(s)
    }

    #[test]
    fn test_mark_and_lookup() {
        let tracker = HeldCallTracker::new();
        let call = id("GCID=(2,100)");

        assert!(!tracker.was_held(&call));
        tracker.mark_held(&call, Some("5551234".to_string()));
        assert!(tracker.was_held(&call));
        assert_eq!(tracker.original_number_of(&call).as_deref(), Some("5551234"));
    }

    #[test]
    fn test_forget_removes_entry() {
        let tracker = HeldCallTracker::new();
        let call = id("GCID=(2,100)");

        tracker.mark_held(&call, Some("5551234".to_string()));
        tracker.forget(&call);
        assert!(!tracker.was_held(&call));
        assert!(tracker.original_number_of(&call).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_entry_without_number() {
        let tracker = HeldCallTracker::new();
        let call = id("GCID=(2,101)");

        tracker.mark_held(&call, None);
        assert!(tracker.was_held(&call));
        assert!(tracker.original_number_of(&call).is_none());
    }
}
