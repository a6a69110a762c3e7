//! Scheduler module
//!
//! Drives the periodic progress polling of a tracked job.

mod poller;

pub use poller::{PollEvent, PollerHandle, ProgressPoller, SessionEvent};
