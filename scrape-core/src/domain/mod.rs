//! Core domain types
//!
//! This module contains the domain structures shared between the HTTP client
//! (which decodes them) and the tracker (which drives the job lifecycle).

pub mod outcome;
pub mod phase;
pub mod progress;
pub mod session;
