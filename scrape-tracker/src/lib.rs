//! Scrape job tracker
//!
//! Starts scrape jobs on the server, polls their progress and reconciles the
//! terminal state into a single [`NormalizedOutcome`](scrape_core::domain::outcome::NormalizedOutcome).
//!
//! Rendering is left to a [`PresentationAdapter`] supplied by the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod presentation;
pub mod repository;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use client::{JobClient, JobSession};
pub use config::TrackerConfig;
pub use error::{PollError, StartError};
pub use presentation::PresentationAdapter;
pub use repository::{HttpJobRepository, JobRepository};
