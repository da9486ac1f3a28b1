//! Vendor call-lifecycle events
//!
//! A push-based stream with no delivery guarantees beyond at-least-once per
//! distinct transition. Events may arrive out of order, duplicated, and the
//! same logical transition may surface both as a connection event and as a
//! terminal event.

use crate::domain::call::port::CallHandle;

#[derive(Debug, Clone)]
pub enum PbxEvent {
    /// A connection was created for a call; carries the connection's
    /// address, which for the first connection is the calling party.
    ConnectionCreated { handle: CallHandle, address: String },
    /// A connection started alerting (ringing at the far end of it).
    ConnectionAlerting { handle: CallHandle, address: String },
    /// The monitored terminal itself started ringing.
    TerminalRinging {
        handle: CallHandle,
        terminal: String,
        address: String,
    },
    /// A connection reached the connected state.
    ConnectionConnected { handle: CallHandle, address: String },
    /// The monitored terminal went active on the call.
    TerminalActive {
        handle: CallHandle,
        terminal: String,
        address: String,
    },
    /// The vendor stopped observing the call; the call is gone.
    ObservationEnded { handle: CallHandle },
}

impl PbxEvent {
    pub fn handle(&self) -> &CallHandle {
        match self {
            PbxEvent::ConnectionCreated { handle, .. }
            | PbxEvent::ConnectionAlerting { handle, .. }
            | PbxEvent::TerminalRinging { handle, .. }
            | PbxEvent::ConnectionConnected { handle, .. }
            | PbxEvent::TerminalActive { handle, .. }
            | PbxEvent::ObservationEnded { handle } => handle,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PbxEvent::ConnectionCreated { .. } => "connection_created",
            PbxEvent::ConnectionAlerting { .. } => "connection_alerting",
            PbxEvent::TerminalRinging { .. } => "terminal_ringing",
            PbxEvent::ConnectionConnected { .. } => "connection_connected",
            PbxEvent::TerminalActive { .. } => "terminal_active",
            PbxEvent::ObservationEnded { .. } => "observation_ended",
        }
    }
}
