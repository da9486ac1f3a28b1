//! Call state model
//!
//! A simplified projection of vendor call states, plus the per-handle record
//! the registry maintains. Elapsed talk/hold time is a computed query over
//! the stored timestamps; nothing here is pushed by timers.

use crate::domain::call::identity::CallIdentity;
use crate::domain::call::port::CallHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Call state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    /// Call object exists, nothing is ringing yet
    Created,
    /// Ringing at a connection or at the monitored terminal
    Alerting,
    /// Ringing reported specifically by the terminal
    Ringing,
    /// Both ends talking
    Connected,
    /// On hold at the monitored extension
    Hold,
    /// Call has ended
    Disconnected,
    /// The vendor invalidated the handle; the logical call may survive
    Invalid,
}

impl CallState {
    pub fn as_str(&self) -> &str {
        match self {
            CallState::Created => "created",
            CallState::Alerting => "alerting",
            CallState::Ringing => "ringing",
            CallState::Connected => "connected",
            CallState::Hold => "hold",
            CallState::Disconnected => "disconnected",
            CallState::Invalid => "invalid",
        }
    }

    /// States a call list presents as "ringing"
    pub fn is_ringing(&self) -> bool {
        matches!(self, CallState::Created | CallState::Alerting | CallState::Ringing)
    }

    pub fn is_talking(&self) -> bool {
        matches!(self, CallState::Connected)
    }
}

/// Call direction, derived heuristically from the calling number and the
/// monitored address (the vendor API exposes no protocol-level flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Inbound,
    Outbound,
}

/// One entry per currently-known call handle.
///
/// `number` and `address` are last-known-good: merges only overwrite them
/// with non-`None` values. `original_number`/`original_address` are the
/// snapshot taken when the call went on hold, so dialing information can be
/// recovered after the vendor invalidates the handle. `was_held` and
/// `manually_picked_up` are sticky once set.
#[derive(Debug, Clone, Serialize)]
pub struct CallInfo {
    #[serde(skip_serializing)]
    pub handle: CallHandle,
    pub identity: CallIdentity,
    pub number: Option<String>,
    pub address: Option<String>,
    pub state: CallState,
    pub last_seen: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub state_entered_at: DateTime<Utc>,
    pub connected_at: Option<DateTime<Utc>>,
    pub original_number: Option<String>,
    pub original_address: Option<String>,
    pub was_held: bool,
    pub manually_picked_up: bool,
    /// Insertion order within the registry, for stable snapshots
    pub seq: u64,
}

impl CallInfo {
    pub fn new(
        handle: CallHandle,
        identity: CallIdentity,
        number: Option<String>,
        state: CallState,
        address: Option<String>,
        seq: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            handle,
            identity,
            number,
            address,
            state,
            last_seen: now,
            started_at: now,
            state_entered_at: now,
            connected_at: None,
            original_number: None,
            original_address: None,
            was_held: false,
            manually_picked_up: false,
            seq,
        }
    }

    /// Merge an update: non-`None` fields overwrite, stale data never
    /// reverts an established value.
    pub fn merge(
        &mut self,
        number: Option<String>,
        state: Option<CallState>,
        address: Option<String>,
    ) {
        if let Some(number) = number {
            self.number = Some(number);
        }
        if let Some(state) = state {
            self.set_state(state);
        }
        if let Some(address) = address {
            self.address = Some(address);
        }
        self.last_seen = Utc::now();
    }

    pub fn set_state(&mut self, state: CallState) {
        if self.state != state {
            self.state = state;
            self.state_entered_at = Utc::now();
            if state == CallState::Connected && self.connected_at.is_none() {
                self.connected_at = Some(self.state_entered_at);
            }
        }
        self.last_seen = Utc::now();
    }

    /// How long the call has been in its current state.
    pub fn elapsed_in_state(&self) -> Duration {
        let seconds = (Utc::now() - self.state_entered_at).num_seconds();
        Duration::from_secs(seconds.max(0) as u64)
    }

    /// Talk time since the call first connected, if it ever did.
    pub fn talk_time(&self) -> Option<Duration> {
        self.connected_at.map(|connected| {
            let seconds = (Utc::now() - connected).num_seconds();
            Duration::from_secs(seconds.max(0) as u64)
        })
    }

    pub fn answered(&self) -> bool {
        self.connected_at.is_some()
    }
}
