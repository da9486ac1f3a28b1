//! Call domain: identity, state, registry, events, commands

pub mod classifier;
pub mod dispatcher;
pub mod event;
pub mod held_tracker;
pub mod history;
pub mod identity;
pub mod info;
pub mod port;
pub mod registry;

pub use classifier::{Decision, EventClassifier, PopTrigger};
pub use dispatcher::CommandDispatcher;
pub use event::PbxEvent;
pub use held_tracker::HeldCallTracker;
pub use history::{CallHistory, HistoryDirection, HistoryRecord};
pub use identity::CallIdentity;
pub use info::{CallDirection, CallInfo, CallState};
pub use port::{CallHandle, CallOriginator, Outcome, UrlOpener, VendorCall, VendorCallState};
pub use registry::{CallRegistry, Listener};
