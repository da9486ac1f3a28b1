//! In-memory PBX simulator
//!
//! A scriptable vendor adapter for integration tests and the demo run.
//! `SimCall` reports a Cisco-style descriptor with a GCID tuple and state
//! suffix, and honors only the capabilities it was built with; everything
//! else answers `NotSupported`, exercising the dispatcher fallback chain.

use crate::domain::call::event::PbxEvent;
use crate::domain::call::port::{CallHandle, CallOriginator, Outcome, VendorCall, VendorCallState};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

/// Which actions a simulated call object exposes.
#[derive(Debug, Clone, Copy)]
pub struct SimCapabilities {
    pub hold: bool,
    pub resume: bool,
    pub answer: bool,
    pub drop: bool,
    pub transfer: bool,
    pub conference: bool,
}

impl Default for SimCapabilities {
    fn default() -> Self {
        Self {
            hold: true,
            resume: true,
            answer: true,
            drop: true,
            transfer: true,
            conference: true,
        }
    }
}

impl SimCapabilities {
    /// A call object exposing nothing, like a restricted provider build.
    pub fn none() -> Self {
        Self {
            hold: false,
            resume: false,
            answer: false,
            drop: false,
            transfer: false,
            conference: false,
        }
    }
}

pub struct SimCall {
    gcid: String,
    state: Mutex<VendorCallState>,
    caps: SimCapabilities,
    originating: Option<String>,
    actions: Mutex<Vec<String>>,
}

impl SimCall {
    pub fn new(gcid: impl Into<String>) -> Self {
        Self {
            gcid: gcid.into(),
            state: Mutex::new(VendorCallState::Active),
            caps: SimCapabilities::default(),
            originating: None,
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capabilities(mut self, caps: SimCapabilities) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_originating_address(mut self, address: impl Into<String>) -> Self {
        self.originating = Some(address.into());
        self
    }

    /// Force the vendor-side state, simulating invalidation or teardown.
    pub fn set_vendor_state(&self, state: VendorCallState) {
        *self.state.lock().unwrap() = state;
    }

    /// Actions invoked against this object, in order.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: &str, allowed: bool, next: VendorCallState) -> Outcome {
        if !allowed {
            return Outcome::NotSupported;
        }
        let mut state = self.state.lock().unwrap();
        if matches!(*state, VendorCallState::Invalid | VendorCallState::Ended) {
            return Outcome::Failed("call object is invalid".to_string());
        }
        self.actions.lock().unwrap().push(action.to_string());
        *state = next;
        debug!(gcid = %self.gcid, action, "sim: action executed");
        Outcome::Completed
    }
}

impl VendorCall for SimCall {
    fn descriptor(&self) -> String {
        let state = match *self.state.lock().unwrap() {
            VendorCallState::Active => "ACTIVE",
            VendorCallState::Held => "HELD",
            VendorCallState::Invalid => "INVALID",
            VendorCallState::Ended => "ENDED",
            VendorCallState::Unknown => "UNKNOWN",
        };
        format!("Call[GCID=({})]->{state}", self.gcid)
    }

    fn vendor_state(&self) -> VendorCallState {
        *self.state.lock().unwrap()
    }

    fn originating_address(&self) -> Option<String> {
        self.originating.clone()
    }

    fn hold(&self) -> Outcome {
        self.record("hold", self.caps.hold, VendorCallState::Held)
    }

    fn resume(&self) -> Outcome {
        self.record("resume", self.caps.resume, VendorCallState::Active)
    }

    fn answer(&self) -> Outcome {
        self.record("answer", self.caps.answer, VendorCallState::Active)
    }

    fn drop_call(&self) -> Outcome {
        self.record("drop", self.caps.drop, VendorCallState::Ended)
    }

    fn transfer(&self, target: &str) -> Outcome {
        if !self.caps.transfer || target.is_empty() {
            return Outcome::NotSupported;
        }
        self.actions
            .lock()
            .unwrap()
            .push(format!("transfer:{target}"));
        Outcome::Completed
    }

    fn conference(&self, target: &str) -> Outcome {
        if !self.caps.conference || target.is_empty() {
            return Outcome::NotSupported;
        }
        self.actions
            .lock()
            .unwrap()
            .push(format!("conference:{target}"));
        Outcome::Completed
    }
}

/// Simulated provider endpoint: originates calls and pushes events.
pub struct SimPbx {
    extension: String,
    next_gcid: AtomicU64,
    events: mpsc::Sender<PbxEvent>,
    caps: SimCapabilities,
}

impl SimPbx {
    pub fn new(extension: impl Into<String>, events: mpsc::Sender<PbxEvent>) -> Self {
        Self {
            extension: extension.into(),
            next_gcid: AtomicU64::new(1),
            events,
            caps: SimCapabilities::default(),
        }
    }

    pub fn with_capabilities(mut self, caps: SimCapabilities) -> Self {
        self.caps = caps;
        self
    }

    fn next_gcid(&self) -> String {
        format!("1,{}", self.next_gcid.fetch_add(1, Ordering::SeqCst))
    }

    fn emit(&self, event: PbxEvent) {
        // The monitor not keeping up is a test bug, not a runtime concern.
        if self.events.try_send(event).is_err() {
            debug!("sim: event channel full or closed");
        }
    }

    /// Script an inbound call: connection created, then the monitored
    /// terminal rings. Returns the handle for further scripting.
    pub fn incoming_call(&self, caller: &str) -> CallHandle {
        let call = Arc::new(SimCall::new(self.next_gcid()).with_capabilities(self.caps));
        let handle = CallHandle::new(call);
        self.emit(PbxEvent::ConnectionCreated {
            handle: handle.clone(),
            address: caller.to_string(),
        });
        self.emit(PbxEvent::TerminalRinging {
            handle: handle.clone(),
            terminal: self.extension.clone(),
            address: self.extension.clone(),
        });
        handle
    }

    /// Script the far end answering (or the provider's active burst).
    pub fn report_active(&self, handle: &CallHandle, address: &str) {
        self.emit(PbxEvent::ConnectionConnected {
            handle: handle.clone(),
            address: address.to_string(),
        });
    }

    /// Script the end of a call.
    pub fn end_call(&self, handle: &CallHandle) {
        self.emit(PbxEvent::ObservationEnded {
            handle: handle.clone(),
        });
    }
}

impl CallOriginator for SimPbx {
    fn dial(&self, target: &str) -> Result<CallHandle> {
        if target.trim().is_empty() {
            return Err(DomainError::VendorCommand("empty dial target".to_string()));
        }
        let call = Arc::new(
            SimCall::new(self.next_gcid())
                .with_capabilities(self.caps)
                .with_originating_address(self.extension.clone()),
        );
        let handle = CallHandle::new(call);
        debug!(target, call = %handle.descriptor(), "sim: originated call");
        self.emit(PbxEvent::ConnectionCreated {
            handle: handle.clone(),
            address: self.extension.clone(),
        });
        self.emit(PbxEvent::ConnectionAlerting {
            handle: handle.clone(),
            address: target.to_string(),
        });
        Ok(handle)
    }

    fn address_name(&self) -> String {
        self.extension.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_tracks_vendor_state() {
        let call = SimCall::new("1,42");
        assert_eq!(call.descriptor(), "Call[GCID=(1,42)]->ACTIVE");
        call.set_vendor_state(VendorCallState::Invalid);
        assert_eq!(call.descriptor(), "Call[GCID=(1,42)]->INVALID");
    }

    #[test]
    fn test_capabilities_gate_actions() {
        let call = SimCall::new("1,43").with_capabilities(SimCapabilities::none());
        assert_eq!(call.hold(), Outcome::NotSupported);
        assert_eq!(call.answer(), Outcome::NotSupported);
        assert!(call.actions().is_empty());

        let call = SimCall::new("1,44");
        assert_eq!(call.hold(), Outcome::Completed);
        assert_eq!(call.vendor_state(), VendorCallState::Held);
        assert_eq!(call.actions(), vec!["hold"]);
    }

    #[tokio::test]
    async fn test_dial_emits_created_then_alerting() {
        let (tx, mut rx) = mpsc::channel(8);
        let pbx = SimPbx::new("2001", tx);

        let handle = pbx.dial("5559999").unwrap();
        assert!(handle.descriptor().contains("GCID=(1,1)"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind(), "connection_created");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind(), "connection_alerting");
    }

    #[tokio::test]
    async fn test_incoming_call_rings_monitored_terminal() {
        let (tx, mut rx) = mpsc::channel(8);
        let pbx = SimPbx::new("2001", tx);

        pbx.incoming_call("5551234");
        let created = rx.recv().await.unwrap();
        assert_eq!(created.kind(), "connection_created");
        match rx.recv().await.unwrap() {
            PbxEvent::TerminalRinging { terminal, .. } => assert_eq!(terminal, "2001"),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
