//! End-to-end flows through registry, classifier, monitor, and simulator.

use ctipop::application::CallMonitor;
use ctipop::domain::call::classifier::{EventClassifier, PopTrigger};
use ctipop::domain::call::history::{CallHistory, HistoryDirection};
use ctipop::domain::call::info::{CallInfo, CallState};
use ctipop::domain::call::port::{CallHandle, UrlOpener, VendorCallState};
use ctipop::domain::call::registry::{CallRegistry, Listener};
use ctipop::domain::call::PbxEvent;
use ctipop::infrastructure::pbx::{SimCall, SimPbx};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

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

struct RecordingOpener {
    numbers: Mutex<Vec<String>>,
}

impl RecordingOpener {
    fn new() -> Self {
        Self {
            numbers: Mutex::new(Vec::new()),
        }
    }

    fn popped(&self) -> Vec<String> {
        self.numbers.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open_url_for_number(&self, number: &str) -> ctipop::Result<()> {
        self.numbers.lock().unwrap().push(number.to_string());
        Ok(())
    }
}

fn sim_handle(gcid: &str) -> (Arc<SimCall>, CallHandle) {
    let call = Arc::new(SimCall::new(gcid));
    let handle = CallHandle::new(call.clone());
    (call, handle)
}

fn monitor_for(
    registry: Arc<CallRegistry>,
    opener: Arc<RecordingOpener>,
    history: Arc<CallHistory>,
    trigger: PopTrigger,
    delay_ms: u64,
) -> CallMonitor {
    let classifier = EventClassifier::new(
        Some("2001".to_string()),
        trigger,
        Arc::new(AtomicBool::new(true)),
    );
    CallMonitor::new(
        registry,
        classifier,
        opener,
        history,
        Duration::from_millis(delay_ms),
    )
}

fn drain(pbx_rx: &mut mpsc::Receiver<PbxEvent>, monitor: &mut CallMonitor) {
    while let Ok(event) = pbx_rx.try_recv() {
        monitor.handle_event(event);
    }
}

#[test]
fn duplicate_report_fires_exactly_one_update() {
    let registry = CallRegistry::new();
    let listener = Arc::new(CountingListener::default());
    registry.add_listener(listener.clone());

    let (_, handle) = sim_handle("9,1");
    registry.add_or_update(
        &handle,
        Some("5551234".to_string()),
        Some(CallState::Alerting),
        Some("2001".to_string()),
    );
    registry.add_or_update(
        &handle,
        Some("5551234".to_string()),
        Some(CallState::Alerting),
        Some("2001".to_string()),
    );

    assert_eq!(listener.added.load(Ordering::SeqCst), 1);
    assert_eq!(listener.updated.load(Ordering::SeqCst), 1);
    assert_eq!(registry.count(), 1);
}

#[test]
fn new_handle_adopts_held_info_from_same_identity() {
    let registry = CallRegistry::new();

    let (old_call, old_handle) = sim_handle("9,2");
    registry.add_or_update(
        &old_handle,
        Some("5551234".to_string()),
        Some(CallState::Connected),
        Some("2001".to_string()),
    );
    assert!(registry.hold_call(&old_handle));

    // Cisco-style: the held call's handle is invalidated and a fresh one
    // appears for the same GCID.
    old_call.set_vendor_state(VendorCallState::Invalid);
    let (_, new_handle) = sim_handle("9,2");
    let info = registry.add_or_update(&new_handle, None, Some(CallState::Created), None);

    assert!(info.was_held);
    assert_eq!(info.original_number.as_deref(), Some("5551234"));
    assert_eq!(registry.count(), 1);
}

#[test]
fn tracker_survives_invalidation_but_not_termination() {
    let registry = CallRegistry::new();

    let (call, handle) = sim_handle("9,3");
    registry.add_or_update(
        &handle,
        Some("5551234".to_string()),
        Some(CallState::Connected),
        None,
    );
    assert!(registry.hold_call(&handle));

    call.set_vendor_state(VendorCallState::Invalid);
    registry.remove(&handle);
    assert_eq!(registry.tracker().len(), 1);

    // The recreated call ends for real this time.
    let (call2, handle2) = sim_handle("9,3");
    registry.add_or_update(&handle2, None, Some(CallState::Connected), None);
    call2.set_vendor_state(VendorCallState::Ended);
    registry.remove(&handle2);
    assert!(registry.tracker().is_empty());
}

#[test]
fn resume_of_invalid_held_call_redials_original_number() {
    let (event_tx, _event_rx) = mpsc::channel(16);
    let pbx = Arc::new(SimPbx::new("2001", event_tx));
    let registry = CallRegistry::new();
    registry.set_originator(pbx);

    let (call, handle) = sim_handle("9,4");
    registry.add_or_update(
        &handle,
        Some("5551234".to_string()),
        Some(CallState::Connected),
        None,
    );
    assert!(registry.hold_call(&handle));
    call.set_vendor_state(VendorCallState::Invalid);

    assert!(registry.resume_call(&handle));
    let calls = registry.snapshot();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].number.as_deref(), Some("5551234"));
    assert!(registry.get(&handle).is_none());
}

#[tokio::test]
async fn inbound_call_pops_once_and_never_auto_connects() {
    let registry = Arc::new(CallRegistry::new());
    let opener = Arc::new(RecordingOpener::new());
    let history = Arc::new(CallHistory::new());
    let mut monitor = monitor_for(
        registry.clone(),
        opener.clone(),
        history,
        PopTrigger::Ringing,
        10,
    );

    let (event_tx, mut event_rx) = mpsc::channel(16);
    let pbx = SimPbx::new("2001", event_tx);
    let handle = pbx.incoming_call("5551234");
    // The provider repeats itself.
    pbx.report_active(&handle, "5551234");
    pbx.report_active(&handle, "5551234");
    drain(&mut event_rx, &mut monitor);

    assert_eq!(opener.popped(), vec!["5551234"]);
    let info = registry.get(&handle).unwrap();
    assert_ne!(info.state, CallState::Connected);
    assert!(!info.manually_picked_up);
}

#[tokio::test]
async fn inbound_end_to_end_pick_talk_hangup() {
    let registry = Arc::new(CallRegistry::new());
    let opener = Arc::new(RecordingOpener::new());
    let history = Arc::new(CallHistory::new());
    let mut monitor = monitor_for(
        registry.clone(),
        opener.clone(),
        history.clone(),
        PopTrigger::Ringing,
        10,
    );

    let (event_tx, mut event_rx) = mpsc::channel(16);
    let pbx = SimPbx::new("2001", event_tx);
    let handle = pbx.incoming_call("5551234");
    drain(&mut event_rx, &mut monitor);
    assert_eq!(opener.popped().len(), 1);

    assert!(registry.pick_call(&handle));
    let info = registry.get(&handle).unwrap();
    assert_eq!(info.state, CallState::Connected);
    assert!(info.manually_picked_up);

    // Post-pick active report keeps the call connected.
    pbx.report_active(&handle, "5551234");
    drain(&mut event_rx, &mut monitor);
    assert_eq!(registry.get(&handle).unwrap().state, CallState::Connected);

    assert!(registry.disconnect_call(&handle));
    pbx.end_call(&handle);
    drain(&mut event_rx, &mut monitor);

    assert_eq!(registry.count(), 0);
    let records = history.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].direction, HistoryDirection::Inbound);
    assert!(records[0].answered);
}

#[tokio::test]
async fn outbound_call_never_pops_and_connects_after_delay() {
    let registry = Arc::new(CallRegistry::new());
    let opener = Arc::new(RecordingOpener::new());
    let history = Arc::new(CallHistory::new());
    let mut monitor = monitor_for(
        registry.clone(),
        opener.clone(),
        history.clone(),
        PopTrigger::Connected,
        20,
    );

    let (event_tx, mut event_rx) = mpsc::channel(16);
    let pbx = Arc::new(SimPbx::new("2001", event_tx));
    registry.set_originator(pbx.clone());

    assert!(registry.dial_call("5559999"));
    drain(&mut event_rx, &mut monitor);

    let calls = registry.snapshot();
    assert_eq!(calls.len(), 1);
    let handle = calls[0].handle.clone();
    assert_eq!(calls[0].state, CallState::Alerting);

    pbx.report_active(&handle, "5559999");
    drain(&mut event_rx, &mut monitor);
    assert_eq!(registry.get(&handle).unwrap().state, CallState::Alerting);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(registry.get(&handle).unwrap().state, CallState::Connected);
    assert!(opener.popped().is_empty());

    registry.disconnect_call(&handle);
    pbx.end_call(&handle);
    drain(&mut event_rx, &mut monitor);
    let records = history.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].direction, HistoryDirection::Outbound);
}

#[test]
fn transfer_and_conference_require_a_target() {
    let registry = CallRegistry::new();
    let (call, handle) = sim_handle("9,20");
    registry.add_or_update(
        &handle,
        Some("5550001".to_string()),
        Some(CallState::Connected),
        None,
    );

    assert!(!registry.transfer_call(&handle, "  "));
    assert!(registry.transfer_call(&handle, "2002"));
    assert!(registry.conference_call(&handle, "2003"));
    assert_eq!(call.actions(), vec!["transfer:2002", "conference:2003"]);
}

#[test]
fn pick_holds_the_other_connected_call() {
    let registry = Arc::new(CallRegistry::new());

    let (_, first) = sim_handle("9,10");
    registry.add_or_update(
        &first,
        Some("5550001".to_string()),
        Some(CallState::Connected),
        Some("2001".to_string()),
    );

    let (_, second) = sim_handle("9,11");
    registry.add_or_update(
        &second,
        Some("5550002".to_string()),
        Some(CallState::Alerting),
        Some("2001".to_string()),
    );

    assert!(registry.pick_call(&second));
    assert_eq!(registry.get(&second).unwrap().state, CallState::Connected);
    let held = registry.get(&first).unwrap();
    assert_eq!(held.state, CallState::Hold);
    assert!(held.was_held);
    assert_eq!(held.original_number.as_deref(), Some("5550001"));
}
