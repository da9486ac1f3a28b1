//! Boundary traits toward the vendor telephony stack
//!
//! The vendor SDK is an opaque event source and command sink. Its capability
//! surface varies by vendor and call state, so every action method defaults
//! to [`Outcome::NotSupported`]; adapters override only what their object
//! kind actually exposes. Absence of a capability is a normal outcome, not
//! an error.

use crate::domain::shared::result::Result;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// Result of a single capability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The vendor accepted and executed the action.
    Completed,
    /// The underlying object does not expose this action.
    NotSupported,
    /// The action exists but the vendor rejected or botched it.
    Failed(String),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

/// Vendor-reported lifecycle state of a call object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorCallState {
    Active,
    Held,
    /// The vendor invalidated the object; for some providers this is the
    /// normal fate of a held call and the logical call is still alive.
    Invalid,
    /// The call is truly over.
    Ended,
    Unknown,
}

/// One vendor call object.
///
/// `descriptor` is the vendor's textual form of the handle; it may embed a
/// GCID tuple and a volatile state suffix, and it is the only raw material
/// for identity resolution.
#[cfg_attr(test, automock)]
pub trait VendorCall: Send + Sync {
    fn descriptor(&self) -> String;
    fn vendor_state(&self) -> VendorCallState;

    /// Name of the address that originated the call, when the vendor
    /// exposes it. Used by the direction heuristic.
    fn originating_address(&self) -> Option<String> {
        None
    }

    fn hold(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn set_held(&self, _held: bool) -> Outcome {
        Outcome::NotSupported
    }
    fn consult(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn park(&self) -> Outcome {
        Outcome::NotSupported
    }
    /// Transfer with an empty target, which some providers treat as hold.
    fn transfer_as_hold(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn resume(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn off_hook(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn unhold(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn retrieve(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn answer(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn pickup(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn drop_call(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn disconnect(&self) -> Outcome {
        Outcome::NotSupported
    }
    fn transfer(&self, _target: &str) -> Outcome {
        Outcome::NotSupported
    }
    fn conference(&self, _target: &str) -> Outcome {
        Outcome::NotSupported
    }
}

/// Shared, cheaply clonable reference to a vendor call object.
///
/// Equality and hashing use pointer identity, matching the vendor's notion
/// of "same physical object": an invalidate/recreate cycle yields a handle
/// that is *not* equal even though it may resolve to the same
/// [`CallIdentity`](super::identity::CallIdentity).
#[derive(Clone)]
pub struct CallHandle(Arc<dyn VendorCall>);

impl CallHandle {
    pub fn new(inner: Arc<dyn VendorCall>) -> Self {
        Self(inner)
    }

    pub fn descriptor(&self) -> String {
        self.0.descriptor()
    }

    pub fn vendor_state(&self) -> VendorCallState {
        self.0.vendor_state()
    }

    pub fn vendor(&self) -> &dyn VendorCall {
        &*self.0
    }

    fn thin_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for CallHandle {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.thin_ptr(), other.thin_ptr())
    }
}

impl Eq for CallHandle {}

impl Hash for CallHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.thin_ptr() as usize).hash(state);
    }
}

impl fmt::Debug for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallHandle({})", self.0.descriptor())
    }
}

/// Command sink for originating new outbound calls.
#[cfg_attr(test, automock)]
pub trait CallOriginator: Send + Sync {
    /// Place a new call from the monitored extension to `target`.
    fn dial(&self, target: &str) -> Result<CallHandle>;

    /// Name of the originating (monitored) address.
    fn address_name(&self) -> String;
}

/// Screen-pop callback. Invoked at most once per logical call.
#[cfg_attr(test, automock)]
pub trait UrlOpener: Send + Sync {
    fn open_url_for_number(&self, number: &str) -> Result<()>;
}
