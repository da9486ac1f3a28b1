//! Best-effort command dispatch against the vendor capability surface
//!
//! Commands are issued as a prioritized capability search: the most specific
//! action first, then alternatives at decreasing specificity, stopping at the
//! first success. Each probe is independent; a failed or unsupported probe
//! never prevents trying the next candidate.

use crate::domain::call::port::{CallHandle, Outcome};
use tracing::debug;

/// A single named capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Hold,
    SetHeld,
    Consult,
    TransferAsHold,
    Park,
    Resume,
    OffHook,
    Unhold,
    Retrieve,
    Answer,
    Pickup,
    Drop,
    Disconnect,
    Transfer,
    Conference,
}

impl Probe {
    pub fn name(&self) -> &'static str {
        match self {
            Probe::Hold => "hold",
            Probe::SetHeld => "set_held",
            Probe::Consult => "consult",
            Probe::TransferAsHold => "transfer_as_hold",
            Probe::Park => "park",
            Probe::Resume => "resume",
            Probe::OffHook => "off_hook",
            Probe::Unhold => "unhold",
            Probe::Retrieve => "retrieve",
            Probe::Answer => "answer",
            Probe::Pickup => "pickup",
            Probe::Drop => "drop",
            Probe::Disconnect => "disconnect",
            Probe::Transfer => "transfer",
            Probe::Conference => "conference",
        }
    }
}

/// Ordered probe sequences. Exact "hold" outranks the consultative and
/// park-style mechanisms, which suspend media through side effects and vary
/// in availability per vendor and call state.
const HOLD_PROBES: &[Probe] = &[
    Probe::Hold,
    Probe::SetHeld,
    Probe::Consult,
    Probe::TransferAsHold,
    Probe::Park,
];
const RESUME_PROBES: &[Probe] = &[Probe::Resume, Probe::OffHook, Probe::Unhold, Probe::Retrieve];
const PICK_PROBES: &[Probe] = &[Probe::Answer, Probe::Pickup];
const DISCONNECT_PROBES: &[Probe] = &[Probe::Drop, Probe::Disconnect];
const TRANSFER_PROBES: &[Probe] = &[Probe::Transfer];
const CONFERENCE_PROBES: &[Probe] = &[Probe::Conference];

/// Typed replacement for reflective method scanning: runs ordered probe
/// sequences against [`crate::domain::call::port::VendorCall`].
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    /// Park can "succeed" by moving the call to a slot the agent cannot see;
    /// disabled unless the deployment explicitly wants it.
    allow_park: bool,
}

impl CommandDispatcher {
    pub fn new(allow_park: bool) -> Self {
        Self { allow_park }
    }

    pub fn hold(&self, call: &CallHandle) -> bool {
        self.run(call, HOLD_PROBES, None)
    }

    pub fn resume(&self, call: &CallHandle) -> bool {
        self.run(call, RESUME_PROBES, None)
    }

    pub fn pick(&self, call: &CallHandle) -> bool {
        self.run(call, PICK_PROBES, None)
    }

    pub fn disconnect(&self, call: &CallHandle) -> bool {
        self.run(call, DISCONNECT_PROBES, None)
    }

    pub fn transfer(&self, call: &CallHandle, target: &str) -> bool {
        self.run(call, TRANSFER_PROBES, Some(target))
    }

    pub fn conference(&self, call: &CallHandle, target: &str) -> bool {
        self.run(call, CONFERENCE_PROBES, Some(target))
    }

    fn run(&self, call: &CallHandle, probes: &[Probe], target: Option<&str>) -> bool {
        for probe in probes {
            if *probe == Probe::Park && !self.allow_park {
                debug!(probe = probe.name(), "skipping disabled probe");
                continue;
            }
            match self.invoke(call, *probe, target) {
                Outcome::Completed => {
                    debug!(probe = probe.name(), call = %call.descriptor(), "probe succeeded");
                    return true;
                }
                Outcome::NotSupported => {
                    debug!(probe = probe.name(), "capability not exposed, trying next");
                }
                Outcome::Failed(reason) => {
                    debug!(probe = probe.name(), %reason, "probe failed, trying next");
                }
            }
        }
        false
    }

    fn invoke(&self, call: &CallHandle, probe: Probe, target: Option<&str>) -> Outcome {
        let vendor = call.vendor();
        match probe {
            Probe::Hold => vendor.hold(),
            Probe::SetHeld => vendor.set_held(true),
            Probe::Consult => vendor.consult(),
            Probe::TransferAsHold => vendor.transfer_as_hold(),
            Probe::Park => vendor.park(),
            Probe::Resume => vendor.resume(),
            Probe::OffHook => vendor.off_hook(),
            Probe::Unhold => vendor.unhold(),
            Probe::Retrieve => vendor.retrieve(),
            Probe::Answer => vendor.answer(),
            Probe::Pickup => vendor.pickup(),
            Probe::Drop => vendor.drop_call(),
            Probe::Disconnect => vendor.disconnect(),
            Probe::Transfer => vendor.transfer(target.unwrap_or_default()),
            Probe::Conference => vendor.conference(target.unwrap_or_default()),
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(false)
    }
}
