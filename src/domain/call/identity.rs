//! Stable call identity derived from vendor handle descriptors
//!
//! PBX vendors may invalidate a call object mid-call (Cisco does this when a
//! call is held) and report the same logical call through a fresh handle. The
//! only thing the two handles reliably share is the global call id embedded
//! in their textual form, e.g. `GCID=(2,5774305)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-derived stable key for a logical call.
///
/// Resolution is a best-effort heuristic: two handles resolve to the same
/// identity only when the vendor preserves the GCID tuple in their textual
/// form. Two distinct calls whose descriptors happened to share a GCID
/// substring would incorrectly merge; no structured id is available at this
/// boundary to rule that out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallIdentity(String);

impl CallIdentity {
    /// Resolve a stable identity from a handle descriptor.
    ///
    /// Prefers the `GCID=(...)` tuple when present, otherwise strips a
    /// trailing volatile state suffix like `->ACTIVE` or `->INVALID`,
    /// otherwise uses the full descriptor.
    pub fn resolve(descriptor: &str) -> Self {
        if let Some(gcid_start) = descriptor.find("GCID=(") {
            if let Some(close) = descriptor[gcid_start..].find(')') {
                return Self(descriptor[gcid_start..gcid_start + close + 1].to_string());
            }
        }
        if let Some(arrow) = descriptor.rfind("->") {
            if arrow > 0 {
                return Self(descriptor[..arrow].to_string());
            }
        }
        Self(descriptor.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
