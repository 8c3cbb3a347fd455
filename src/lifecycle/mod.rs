//! Focus-loss detection contract.
//!
//! The host reports what it knows when the app leaves the foreground; the
//! adapter decides whether that counts as leaving the focus context and, if
//! so, fires a single callback. How the host learns about screens and calls
//! is its own business.

mod adapter;
mod policy;

pub use adapter::{FocusLossSink, LifecycleAdapter};
pub use policy::{FocusLossPolicy, HostContext};
