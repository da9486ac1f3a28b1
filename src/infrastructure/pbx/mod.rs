//! PBX provider adapters

pub mod sim;

pub use sim::{SimCall, SimCapabilities, SimPbx};
