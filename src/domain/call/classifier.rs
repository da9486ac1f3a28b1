//! Event classification
//!
//! Turns the raw vendor event stream into registry updates and screen-pop
//! decisions. The classifier is deliberately conservative: inbound calls are
//! never promoted to CONNECTED by events alone, only a manual pick does
//! that, and outbound calls defer their CONNECTED promotion behind a delay
//! so that the provider's optimistic "active" burst right after dialing does
//! not show a talking call that is still ringing.

use crate::domain::call::identity::CallIdentity;
use crate::domain::call::info::{CallDirection, CallInfo, CallState};
use crate::domain::call::event::PbxEvent;
use crate::domain::call::port::CallHandle;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Which call state fires the screen pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopTrigger {
    Ringing,
    Connected,
}

/// What the monitor should do with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Apply {
        number: Option<String>,
        state: Option<CallState>,
        address: Option<String>,
        direction: CallDirection,
        /// Caller number to pop a URL for, at most once per logical call.
        pop: Option<String>,
        /// Promote to CONNECTED after the outbound delay, re-checking first.
        defer_connect: bool,
    },
    Remove,
    Ignore,
}

impl Decision {
    fn apply(
        number: Option<String>,
        state: Option<CallState>,
        address: Option<String>,
        direction: CallDirection,
    ) -> Self {
        Decision::Apply {
            number,
            state,
            address,
            direction,
            pop: None,
            defer_connect: false,
        }
    }
}

/// Stateful per-extension classifier.
///
/// Caches the calling number per logical call (the first connection's
/// address), remembers which calls already popped, and applies the direction
/// heuristic against the monitored address.
pub struct EventClassifier {
    monitored_address: Option<String>,
    trigger: PopTrigger,
    pop_enabled: Arc<AtomicBool>,
    caller_cache: HashMap<CallIdentity, String>,
    popped: HashSet<CallIdentity>,
}

impl EventClassifier {
    pub fn new(
        monitored_address: Option<String>,
        trigger: PopTrigger,
        pop_enabled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            monitored_address,
            trigger,
            pop_enabled,
            caller_cache: HashMap::new(),
            popped: HashSet::new(),
        }
    }

    /// Classify one event against the registry's current view of the call.
    pub fn classify(&mut self, event: &PbxEvent, existing: Option<&CallInfo>) -> Decision {
        let identity = CallIdentity::resolve(&event.handle().descriptor());

        match event {
            PbxEvent::ConnectionCreated { address, .. } => {
                // The first connection created for a call is the calling
                // party; later connections never overwrite the cache.
                self.caller_cache
                    .entry(identity.clone())
                    .or_insert_with(|| address.clone());
                let number = self.caller_number(&identity, address);
                let direction = self.direction(&number, event.handle());
                // Created never regresses a call that is already ringing.
                let state = match existing {
                    Some(info) if info.state != CallState::Created => None,
                    _ => Some(CallState::Created),
                };
                // For an outbound call the calling party is our own
                // extension; never let it overwrite the dialed number.
                let number = match direction {
                    CallDirection::Inbound => Some(number),
                    CallDirection::Outbound => None,
                };
                Decision::apply(number, state, None, direction)
            }

            PbxEvent::ConnectionAlerting { address, .. } => {
                let caller = self.caller_number(&identity, address);
                let direction = self.direction(&caller, event.handle());
                // Outbound: the alerting connection is the ringing far end.
                let number = match direction {
                    CallDirection::Inbound => caller.clone(),
                    CallDirection::Outbound => address.clone(),
                };
                let mut decision = Decision::apply(
                    Some(number.clone()),
                    Some(CallState::Alerting),
                    None,
                    direction,
                );
                if self.trigger == PopTrigger::Ringing {
                    self.attach_pop(&mut decision, &identity, &number, event.handle());
                }
                decision
            }

            PbxEvent::TerminalRinging {
                terminal, address, ..
            } => {
                if !self.matches_monitored(terminal, address) {
                    return Decision::Ignore;
                }
                let number = self.caller_number(&identity, address);
                let direction = self.direction(&number, event.handle());
                let mut decision = Decision::apply(
                    Some(number.clone()),
                    Some(CallState::Ringing),
                    Some(terminal.clone()),
                    direction,
                );
                if self.trigger == PopTrigger::Ringing {
                    self.attach_pop(&mut decision, &identity, &number, event.handle());
                }
                decision
            }

            PbxEvent::ConnectionConnected { address, .. } => {
                let number = self.caller_number(&identity, address);
                self.classify_active(&identity, number, None, existing, event)
            }

            PbxEvent::TerminalActive {
                terminal, address, ..
            } => {
                if !self.matches_monitored(terminal, address) {
                    return Decision::Ignore;
                }
                let number = self.caller_number(&identity, address);
                self.classify_active(
                    &identity,
                    number,
                    Some(terminal.clone()),
                    existing,
                    event,
                )
            }

            PbxEvent::ObservationEnded { .. } => {
                self.caller_cache.remove(&identity);
                self.popped.remove(&identity);
                Decision::Remove
            }
        }
    }

    fn classify_active(
        &mut self,
        identity: &CallIdentity,
        number: String,
        address: Option<String>,
        existing: Option<&CallInfo>,
        event: &PbxEvent,
    ) -> Decision {
        let direction = self.direction(&number, event.handle());
        match direction {
            CallDirection::Outbound => {
                debug!(identity = %identity, "classifier: outbound active, deferring connect");
                Decision::Apply {
                    number: None,
                    state: Some(CallState::Alerting),
                    address,
                    direction,
                    pop: None,
                    defer_connect: true,
                }
            }
            CallDirection::Inbound => {
                let picked = existing.map(|i| i.manually_picked_up).unwrap_or(false);
                let state = if picked {
                    Some(CallState::Connected)
                } else {
                    // Inbound calls only connect through an explicit pick.
                    Some(CallState::Alerting)
                };
                let mut decision = Decision::Apply {
                    number: Some(number.clone()),
                    state,
                    address,
                    direction,
                    pop: None,
                    defer_connect: false,
                };
                if self.trigger == PopTrigger::Connected {
                    self.attach_pop(&mut decision, identity, &number, event.handle());
                }
                decision
            }
        }
    }

    /// Derive direction from the calling number and the monitored address.
    /// The vendor API has no direction flag, so a call whose calling party
    /// *is* our extension must be one we originated.
    fn direction(&self, number: &str, handle: &CallHandle) -> CallDirection {
        let monitored = match &self.monitored_address {
            Some(m) if !m.is_empty() => m,
            _ => return CallDirection::Inbound,
        };
        let number_lower = number.to_lowercase();
        let monitored_lower = monitored.to_lowercase();
        if number_lower == monitored_lower || number_lower.contains(&monitored_lower) {
            return CallDirection::Outbound;
        }
        if let Some(origin) = handle.vendor().originating_address() {
            if origin.eq_ignore_ascii_case(monitored) {
                return CallDirection::Outbound;
            }
        }
        CallDirection::Inbound
    }

    /// Terminal events from other extensions on a shared line are ignored.
    fn matches_monitored(&self, terminal: &str, address: &str) -> bool {
        let monitored = match &self.monitored_address {
            Some(m) if !m.is_empty() => m,
            _ => return true,
        };
        terminal.eq_ignore_ascii_case(monitored)
            || address.eq_ignore_ascii_case(monitored)
            || address.to_lowercase().contains(&monitored.to_lowercase())
    }

    /// Attach a pop to the decision if this call still qualifies: pops are
    /// inbound-only, globally gated, and at most once per logical call.
    fn attach_pop(
        &mut self,
        decision: &mut Decision,
        identity: &CallIdentity,
        number: &str,
        handle: &CallHandle,
    ) {
        if !self.pop_enabled.load(Ordering::Relaxed) {
            return;
        }
        if self.popped.contains(identity) {
            return;
        }
        if self.direction(number, handle) == CallDirection::Outbound {
            return;
        }
        if let Decision::Apply { pop, .. } = decision {
            self.popped.insert(identity.clone());
            debug!(identity = %identity, number, "classifier: firing screen pop");
            *pop = Some(number.to_string());
        }
    }

    fn caller_number(&self, identity: &CallIdentity, fallback: &str) -> String {
        self.caller_cache
            .get(identity)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}
