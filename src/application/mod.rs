//! Application layer

pub mod monitor;

pub use monitor::CallMonitor;
