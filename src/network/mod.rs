//! Connectivity tracking.
//!
//! [`ConnectivitySignal`] is the runtime's online indicator; something outside
//! the reconciler (the [`ConnectivityProbe`], or a test) sets it. Each
//! [`NetworkObserver`] subscribes to it and yields `Online`/`Offline`
//! transitions without timers of its own.

mod probe;
mod signal;

pub use probe::ConnectivityProbe;
pub use signal::{ConnectivitySignal, NetworkEvent, NetworkObserver};
