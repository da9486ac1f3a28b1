//! Call registry: the authoritative view of active calls
//!
//! Ingests partial, duplicated and out-of-order reports via `add_or_update`,
//! assigns stable identity across vendor handle churn, and fans out changes
//! to listeners. All map and tracker mutation happens under one registry
//! lock; listener callbacks and vendor command invocations run outside it.

use crate::domain::call::dispatcher::CommandDispatcher;
use crate::domain::call::held_tracker::HeldCallTracker;
use crate::domain::call::identity::CallIdentity;
use crate::domain::call::info::{CallInfo, CallState};
use crate::domain::call::port::{CallHandle, CallOriginator, VendorCallState};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Change notifications toward the presentation layer. Implementations must
/// not assume any particular calling thread.
pub trait Listener: Send + Sync {
    fn on_call_added(&self, info: &CallInfo);
    fn on_call_updated(&self, info: &CallInfo);
    fn on_call_removed(&self, info: &CallInfo);
}

#[derive(Default)]
struct RegistryState {
    calls: HashMap<CallHandle, CallInfo>,
    next_seq: u64,
}

enum Notify {
    Added,
    Updated,
    Removed,
}

pub struct CallRegistry {
    state: Mutex<RegistryState>,
    listeners: Mutex<Vec<Arc<dyn Listener>>>,
    tracker: HeldCallTracker,
    dispatcher: CommandDispatcher,
    originator: Mutex<Option<Arc<dyn CallOriginator>>>,
    instance_id: Uuid,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::with_dispatcher(CommandDispatcher::default())
    }

    pub fn with_dispatcher(dispatcher: CommandDispatcher) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            listeners: Mutex::new(Vec::new()),
            tracker: HeldCallTracker::new(),
            dispatcher,
            originator: Mutex::new(None),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Attach the command sink used by `dial_call` and the resume fallback.
    pub fn set_originator(&self, originator: Arc<dyn CallOriginator>) {
        *self.originator.lock().unwrap() = Some(originator);
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn add_listener(&self, listener: Arc<dyn Listener>) {
        self.listeners.lock().unwrap().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn Listener>) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Ingest a report about a call. Unseen handles create a new entry,
    /// adopting held/original info from any same-identity stale entry or,
    /// failing that, from the held-call tracker. Existing handles merge
    /// non-`None` fields only, so stale reports never revert state.
    pub fn add_or_update(
        &self,
        handle: &CallHandle,
        number: Option<String>,
        state: Option<CallState>,
        address: Option<String>,
    ) -> CallInfo {
        let identity = CallIdentity::resolve(&handle.descriptor());

        let (snapshot, notify) = {
            let mut reg = self.state.lock().unwrap();
            if let Some(existing) = reg.calls.get_mut(handle) {
                existing.merge(number, state, address);
                debug!(
                    identity = %existing.identity,
                    state = existing.state.as_str(),
                    was_held = existing.was_held,
                    "registry: updated existing call"
                );
                (existing.clone(), Notify::Updated)
            } else {
                // The vendor may have invalidated an earlier handle for the
                // same logical call; adopt its held/original info and drop
                // the stale entry.
                let stale_key = reg
                    .calls
                    .keys()
                    .find(|h| CallIdentity::resolve(&h.descriptor()) == identity)
                    .cloned();
                let adopted = stale_key.and_then(|stale| reg.calls.remove(&stale));

                let seq = reg.next_seq;
                reg.next_seq += 1;
                let mut created = CallInfo::new(
                    handle.clone(),
                    identity.clone(),
                    number,
                    state.unwrap_or(CallState::Created),
                    address,
                    seq,
                );

                if let Some(stale) = adopted {
                    created.was_held = stale.was_held;
                    if stale.original_number.is_some() {
                        created.original_number = stale.original_number;
                    }
                    if stale.original_address.is_some() {
                        created.original_address = stale.original_address;
                    }
                    info!(
                        identity = %identity,
                        was_held = created.was_held,
                        original_number = ?created.original_number,
                        "registry: adopted stale entry with same identity"
                    );
                } else if self.tracker.was_held(&identity) {
                    created.was_held = true;
                    if let Some(number) = self.tracker.original_number_of(&identity) {
                        created.original_number = Some(number);
                    }
                    info!(
                        identity = %identity,
                        original_number = ?created.original_number,
                        "registry: restored held call info from tracker"
                    );
                }

                debug!(
                    registry = %self.instance_id,
                    identity = %identity,
                    state = created.state.as_str(),
                    "registry: created new call entry"
                );
                reg.calls.insert(handle.clone(), created.clone());
                (created, Notify::Added)
            }
        };

        self.notify(&snapshot, notify);
        snapshot
    }

    /// Remove a call. A transiently INVALID handle keeps its tracker entry
    /// so the call can still be resumed after the vendor recreates it; a
    /// truly ended call drops both.
    pub fn remove(&self, handle: &CallHandle) -> Option<CallInfo> {
        let identity = CallIdentity::resolve(&handle.descriptor());
        let invalid = handle.vendor_state() == VendorCallState::Invalid;

        let removed = {
            let mut reg = self.state.lock().unwrap();
            let removed = reg.calls.remove(handle);
            if !invalid {
                self.tracker.forget(&identity);
            }
            removed
        };

        if invalid {
            debug!(identity = %identity, "registry: removed invalid call, tracker preserved");
        } else {
            debug!(identity = %identity, "registry: removed ended call and tracker entry");
        }

        if let Some(ref info) = removed {
            self.notify(info, Notify::Removed);
        }
        removed
    }

    pub fn get(&self, handle: &CallHandle) -> Option<CallInfo> {
        self.state.lock().unwrap().calls.get(handle).cloned()
    }

    /// Point-in-time copy of all calls, in insertion order.
    pub fn snapshot(&self) -> Vec<CallInfo> {
        let reg = self.state.lock().unwrap();
        let mut calls: Vec<CallInfo> = reg.calls.values().cloned().collect();
        calls.sort_by_key(|c| c.seq);
        calls
    }

    pub fn count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn tracker(&self) -> &HeldCallTracker {
        &self.tracker
    }

    /// Answer a ringing call. On success the call becomes CONNECTED with the
    /// sticky `manually_picked_up` flag set, and any other connected call is
    /// put on hold so the agent only talks on one line.
    pub fn pick_call(&self, handle: &CallHandle) -> bool {
        if !self.dispatcher.pick(handle) {
            return false;
        }

        let updated = self.apply(handle, |info| {
            info.set_state(CallState::Connected);
            info.manually_picked_up = true;
        });
        if updated.is_none() {
            warn!("pick: no registry entry for picked call");
        }

        let others: Vec<CallHandle> = {
            let reg = self.state.lock().unwrap();
            reg.calls
                .iter()
                .filter(|(h, info)| *h != handle && info.state == CallState::Connected)
                .map(|(h, _)| h.clone())
                .collect()
        };
        for other in others {
            if !self.hold_call(&other) {
                debug!(call = %other.descriptor(), "pick: failed to hold other connected call");
            }
        }
        true
    }

    /// Put a call on hold. On success the original dialed number is
    /// snapshotted into the entry and the tracker, surviving any later
    /// handle invalidation.
    pub fn hold_call(&self, handle: &CallHandle) -> bool {
        if !self.dispatcher.hold(handle) {
            return false;
        }

        let identity = CallIdentity::resolve(&handle.descriptor());
        let updated = self.apply(handle, |info| {
            info.original_number = info.number.clone();
            info.original_address = info.address.clone();
            info.was_held = true;
            info.set_state(CallState::Hold);
        });
        match updated {
            Some(ref info) => {
                self.tracker.mark_held(&identity, info.original_number.clone());
                info!(identity = %identity, number = ?info.original_number, "hold: call held");
            }
            None => {
                // Held before the first event arrived; track it anyway.
                self.tracker.mark_held(&identity, None);
            }
        }
        true
    }

    /// Resume a held call. For an INVALID handle (the Cisco hold fate) a
    /// native resume is attempted first; if that fails and the tracker holds
    /// the original number, a brand-new outbound call is originated and the
    /// invalid entry discarded.
    pub fn resume_call(&self, handle: &CallHandle) -> bool {
        let identity = CallIdentity::resolve(&handle.descriptor());

        if handle.vendor_state() == VendorCallState::Invalid {
            debug!(identity = %identity, "resume: handle is invalid, trying native resume first");
            if self.dispatcher.resume(handle) {
                self.apply(handle, |info| info.set_state(CallState::Connected));
                return true;
            }

            let was_held = self
                .get(handle)
                .map(|i| i.was_held)
                .unwrap_or_else(|| self.tracker.was_held(&identity));
            let number = self
                .tracker
                .original_number_of(&identity)
                .or_else(|| self.get(handle).and_then(|i| i.original_number));

            if was_held {
                if let Some(number) = number {
                    if let Some(new_handle) = self.redial(&number) {
                        info!(identity = %identity, %number, "resume: re-dialed original number");
                        self.remove(handle);
                        let address = self.originator_address();
                        self.add_or_update(
                            &new_handle,
                            Some(number),
                            Some(CallState::Alerting),
                            address,
                        );
                        return true;
                    }
                }
                warn!(identity = %identity, "resume: invalid held call with no recoverable number");
                self.remove(handle);
            }
            return false;
        }

        if self.dispatcher.resume(handle) {
            self.apply(handle, |info| info.set_state(CallState::Connected));
            true
        } else {
            false
        }
    }

    /// Hang up a call. On success the entry is removed (state DISCONNECTED
    /// is published first so listeners see the transition).
    pub fn disconnect_call(&self, handle: &CallHandle) -> bool {
        if !self.dispatcher.disconnect(handle) {
            return false;
        }
        self.apply(handle, |info| info.set_state(CallState::Disconnected));
        self.remove(handle);
        true
    }

    pub fn transfer_call(&self, handle: &CallHandle, target: &str) -> bool {
        if target.trim().is_empty() {
            return false;
        }
        if !self.dispatcher.transfer(handle, target) {
            return false;
        }
        // The local leg ends via a subsequent vendor event; just refresh.
        self.apply(handle, |_| {});
        info!(target, "transfer: initiated");
        true
    }

    pub fn conference_call(&self, handle: &CallHandle, target: &str) -> bool {
        if target.trim().is_empty() {
            return false;
        }
        if !self.dispatcher.conference(handle, target) {
            return false;
        }
        self.apply(handle, |_| {});
        info!(target, "conference: initiated");
        true
    }

    /// Originate a new outbound call. The entry starts at ALERTING: the far
    /// end has not answered, and promotion to CONNECTED is event-driven.
    pub fn dial_call(&self, target: &str) -> bool {
        if target.trim().is_empty() {
            return false;
        }
        let originator = match self.originator.lock().unwrap().clone() {
            Some(o) => o,
            None => {
                warn!("dial: no originator attached");
                return false;
            }
        };
        match originator.dial(target) {
            Ok(handle) => {
                self.add_or_update(
                    &handle,
                    Some(target.to_string()),
                    Some(CallState::Alerting),
                    Some(originator.address_name()),
                );
                info!(target, "dial: outbound call originated");
                true
            }
            Err(err) => {
                warn!(target, %err, "dial: failed to originate call");
                false
            }
        }
    }

    fn redial(&self, number: &str) -> Option<CallHandle> {
        let originator = self.originator.lock().unwrap().clone()?;
        match originator.dial(number) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(number, %err, "resume: re-dial failed");
                None
            }
        }
    }

    fn originator_address(&self) -> Option<String> {
        self.originator
            .lock()
            .unwrap()
            .as_ref()
            .map(|o| o.address_name())
    }

    /// Mutate an entry under the lock, then notify listeners outside it.
    fn apply(&self, handle: &CallHandle, f: impl FnOnce(&mut CallInfo)) -> Option<CallInfo> {
        let snapshot = {
            let mut reg = self.state.lock().unwrap();
            let info = reg.calls.get_mut(handle)?;
            f(info);
            info.clone()
        };
        self.notify(&snapshot, Notify::Updated);
        Some(snapshot)
    }

    fn notify(&self, info: &CallInfo, kind: Notify) {
        // Iterate a stable copy so listeners may add/remove listeners, and
        // so one listener cannot block registration of another. A panicking
        // listener must neither starve the remaining listeners nor unwind
        // into the mutation that triggered the notification.
        let listeners: Vec<Arc<dyn Listener>> = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            let outcome = catch_unwind(AssertUnwindSafe(|| match kind {
                Notify::Added => listener.on_call_added(info),
                Notify::Updated => listener.on_call_updated(info),
                Notify::Removed => listener.on_call_removed(info),
            }));
            if outcome.is_err() {
                warn!(identity = %info.identity, "listener panicked during notification");
            }
        }
    }
}

impl Default for CallRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::port::{MockVendorCall, Outcome};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingListener {
        added: AtomicUsize,
        updated: AtomicUsize,
        removed: AtomicUsize,
    }

    impl Listener for CountingListener {
        fn on_call_added(&self, _info: &CallInfo) {
            self.added.fetch_add(1, Ordering::SeqCst);
        }
        fn on_call_updated(&self, _info: &CallInfo) {
            self.updated.fetch_add(1, Ordering::SeqCst);
        }
        fn on_call_removed(&self, _info: &CallInfo) {
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn handle_with_state(descriptor: &str, state: VendorCallState) -> CallHandle {
        let mut mock = MockVendorCall::new();
        let descriptor = descriptor.to_string();
        mock.expect_descriptor().returning(move || descriptor.clone());
        mock.expect_vendor_state().returning(move || state);
        CallHandle::new(Arc::new(mock))
    }

    fn active_handle(descriptor: &str) -> CallHandle {
        handle_with_state(descriptor, VendorCallState::Active)
    }

    #[test]
    fn test_idempotent_merge_fires_updated_once() {
        let registry = CallRegistry::new();
        let listener = Arc::new(CountingListener::default());
        registry.add_listener(listener.clone());

        let handle = active_handle("Call[GCID=(1,1)]->ACTIVE");
        let first = registry.add_or_update(
            &handle,
            Some("5551234".to_string()),
            Some(CallState::Alerting),
            Some("2001".to_string()),
        );
        let second = registry.add_or_update(
            &handle,
            Some("5551234".to_string()),
            Some(CallState::Alerting),
            Some("2001".to_string()),
        );

        assert_eq!(first.number, second.number);
        assert_eq!(first.state, second.state);
        assert_eq!(first.address, second.address);
        assert_eq!(listener.added.load(Ordering::SeqCst), 1);
        assert_eq!(listener.updated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_merge_ignores_none_fields() {
        let registry = CallRegistry::new();
        let handle = active_handle("Call[GCID=(1,2)]->ACTIVE");

        registry.add_or_update(
            &handle,
            Some("5551234".to_string()),
            Some(CallState::Alerting),
            Some("2001".to_string()),
        );
        let info = registry.add_or_update(&handle, None, Some(CallState::Connected), None);

        assert_eq!(info.number.as_deref(), Some("5551234"));
        assert_eq!(info.address.as_deref(), Some("2001"));
        assert_eq!(info.state, CallState::Connected);
    }

    #[test]
    fn test_identity_adoption_carries_held_info() {
        let registry = CallRegistry::new();
        let old = active_handle("Call[GCID=(1,3)]->ACTIVE");

        registry.add_or_update(
            &old,
            Some("5551234".to_string()),
            Some(CallState::Connected),
            Some("2001".to_string()),
        );
        // Mark held directly on the entry, as hold_call would.
        {
            let mut reg = registry.state.lock().unwrap();
            let info = reg.calls.get_mut(&old).unwrap();
            info.was_held = true;
            info.original_number = Some("5551234".to_string());
            info.set_state(CallState::Hold);
        }

        // New physical handle, same GCID.
        let new = active_handle("Call[GCID=(1,3)]->INVALID");
        let info = registry.add_or_update(&new, None, Some(CallState::Created), None);

        assert!(info.was_held);
        assert_eq!(info.original_number.as_deref(), Some("5551234"));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_tracker_survives_invalidation_not_termination() {
        let registry = CallRegistry::new();
        let identity = CallIdentity::resolve("Call[GCID=(1,4)]->ACTIVE");

        // Invalid removal preserves the tracker entry.
        let invalid = handle_with_state("Call[GCID=(1,4)]->INVALID", VendorCallState::Invalid);
        registry.add_or_update(
            &invalid,
            Some("5551234".to_string()),
            Some(CallState::Hold),
            None,
        );
        registry.tracker.mark_held(&identity, Some("5551234".to_string()));
        registry.remove(&invalid);
        assert_eq!(
            registry.tracker.original_number_of(&identity).as_deref(),
            Some("5551234")
        );

        // Ended removal drops it.
        let ended = handle_with_state("Call[GCID=(1,4)]->ACTIVE", VendorCallState::Ended);
        registry.add_or_update(&ended, None, Some(CallState::Disconnected), None);
        registry.remove(&ended);
        assert!(!registry.tracker.was_held(&identity));
    }

    #[test]
    fn test_restoration_from_tracker_when_no_stale_entry() {
        let registry = CallRegistry::new();
        let identity = CallIdentity::resolve("Call[GCID=(1,5)]->ACTIVE");
        registry.tracker.mark_held(&identity, Some("5550000".to_string()));

        let handle = active_handle("Call[GCID=(1,5)]->ACTIVE");
        let info = registry.add_or_update(&handle, None, Some(CallState::Created), None);

        assert!(info.was_held);
        assert_eq!(info.original_number.as_deref(), Some("5550000"));
    }

    #[test]
    fn test_pick_sets_connected_and_sticky_flag() {
        let mut mock = MockVendorCall::new();
        mock.expect_descriptor()
            .returning(|| "Call[GCID=(1,6)]->ACTIVE".to_string());
        mock.expect_vendor_state().returning(|| VendorCallState::Active);
        mock.expect_answer().returning(|| Outcome::Completed);
        let handle = CallHandle::new(Arc::new(mock));

        let registry = CallRegistry::new();
        registry.add_or_update(
            &handle,
            Some("5551234".to_string()),
            Some(CallState::Alerting),
            Some("2001".to_string()),
        );

        assert!(registry.pick_call(&handle));
        let info = registry.get(&handle).unwrap();
        assert_eq!(info.state, CallState::Connected);
        assert!(info.manually_picked_up);
    }

    #[test]
    fn test_pick_holds_other_connected_call() {
        let registry = CallRegistry::new();

        let mut other_mock = MockVendorCall::new();
        other_mock
            .expect_descriptor()
            .returning(|| "Call[GCID=(1,7)]->ACTIVE".to_string());
        other_mock
            .expect_vendor_state()
            .returning(|| VendorCallState::Active);
        other_mock.expect_hold().times(1).returning(|| Outcome::Completed);
        let other = CallHandle::new(Arc::new(other_mock));
        registry.add_or_update(
            &other,
            Some("5550001".to_string()),
            Some(CallState::Connected),
            Some("2001".to_string()),
        );

        let mut picked_mock = MockVendorCall::new();
        picked_mock
            .expect_descriptor()
            .returning(|| "Call[GCID=(1,8)]->ACTIVE".to_string());
        picked_mock
            .expect_vendor_state()
            .returning(|| VendorCallState::Active);
        picked_mock.expect_answer().returning(|| Outcome::Completed);
        let picked = CallHandle::new(Arc::new(picked_mock));
        registry.add_or_update(
            &picked,
            Some("5550002".to_string()),
            Some(CallState::Alerting),
            Some("2001".to_string()),
        );

        assert!(registry.pick_call(&picked));
        assert_eq!(registry.get(&other).unwrap().state, CallState::Hold);
        assert!(registry.get(&other).unwrap().was_held);
    }

    #[test]
    fn test_hold_snapshots_original_and_tracker() {
        let mut mock = MockVendorCall::new();
        mock.expect_descriptor()
            .returning(|| "Call[GCID=(1,9)]->ACTIVE".to_string());
        mock.expect_vendor_state().returning(|| VendorCallState::Active);
        mock.expect_hold().returning(|| Outcome::Completed);
        let handle = CallHandle::new(Arc::new(mock));

        let registry = CallRegistry::new();
        registry.add_or_update(
            &handle,
            Some("5551234".to_string()),
            Some(CallState::Connected),
            Some("2001".to_string()),
        );

        assert!(registry.hold_call(&handle));
        let info = registry.get(&handle).unwrap();
        assert_eq!(info.state, CallState::Hold);
        assert!(info.was_held);
        assert_eq!(info.original_number.as_deref(), Some("5551234"));

        let identity = CallIdentity::resolve(&handle.descriptor());
        assert_eq!(
            registry.tracker.original_number_of(&identity).as_deref(),
            Some("5551234")
        );
    }

    #[test]
    fn test_failed_hold_leaves_state_untouched() {
        let mut mock = MockVendorCall::new();
        mock.expect_descriptor()
            .returning(|| "Call[GCID=(1,10)]->ACTIVE".to_string());
        mock.expect_vendor_state().returning(|| VendorCallState::Active);
        mock.expect_hold().returning(|| Outcome::NotSupported);
        mock.expect_set_held().returning(|_| Outcome::NotSupported);
        mock.expect_consult().returning(|| Outcome::NotSupported);
        mock.expect_transfer_as_hold().returning(|| Outcome::NotSupported);
        let handle = CallHandle::new(Arc::new(mock));

        let registry = CallRegistry::new();
        registry.add_or_update(
            &handle,
            Some("5551234".to_string()),
            Some(CallState::Connected),
            None,
        );

        assert!(!registry.hold_call(&handle));
        let info = registry.get(&handle).unwrap();
        assert_eq!(info.state, CallState::Connected);
        assert!(!info.was_held);
        assert!(registry.tracker.is_empty());
    }

    #[test]
    fn test_snapshot_is_insertion_ordered() {
        let registry = CallRegistry::new();
        let first = active_handle("Call[GCID=(1,11)]->ACTIVE");
        let second = active_handle("Call[GCID=(1,12)]->ACTIVE");

        registry.add_or_update(&first, Some("1".to_string()), None, None);
        registry.add_or_update(&second, Some("2".to_string()), None, None);

        let snap = registry.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].number.as_deref(), Some("1"));
        assert_eq!(snap[1].number.as_deref(), Some("2"));
    }

    struct PanickingListener;

    impl Listener for PanickingListener {
        fn on_call_added(&self, _info: &CallInfo) {
            panic!("listener failure");
        }
        fn on_call_updated(&self, _info: &CallInfo) {
            panic!("listener failure");
        }
        fn on_call_removed(&self, _info: &CallInfo) {
            panic!("listener failure");
        }
    }

    #[test]
    fn test_listener_panic_does_not_block_others() {
        let registry = CallRegistry::new();
        registry.add_listener(Arc::new(PanickingListener));
        let counting = Arc::new(CountingListener::default());
        registry.add_listener(counting.clone());

        let handle = active_handle("Call[GCID=(1,13)]->ACTIVE");
        let info = registry.add_or_update(
            &handle,
            Some("5551234".to_string()),
            Some(CallState::Alerting),
            None,
        );
        registry.add_or_update(&handle, None, Some(CallState::Connected), None);
        registry.remove(&handle);

        // The mutation completed and the well-behaved listener saw it all.
        assert_eq!(info.state, CallState::Alerting);
        assert_eq!(counting.added.load(Ordering::SeqCst), 1);
        assert_eq!(counting.updated.load(Ordering::SeqCst), 1);
        assert_eq!(counting.removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dial_without_originator_fails() {
        let registry = CallRegistry::new();
        assert!(!registry.dial_call("5559999"));
        assert!(!registry.dial_call("  "));
    }
}
