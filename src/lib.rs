//! ctipop - PBX screen-pop and call-control client core
//!
//! The centerpiece is the call-state reconciliation engine: a call registry
//! that turns a noisy vendor event stream (duplicated, unordered, handle
//! churn on hold) into a stable call list, plus a typed command dispatcher
//! that drives vendor call control through prioritized capability probes.
//!
//! Vendor SDK, GUI, and URL opening live behind boundary traits in
//! [`domain::call::port`]; [`infrastructure`] ships a scriptable simulator
//! and screen-pop openers.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
