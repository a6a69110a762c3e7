//! Repository layer
//!
//! Repositories are stateless adapters over the scrape server API. They
//! expose exactly the calls the tracker needs and contain no tracking logic.
//!
//! The repository is trait-based so the job client and poller can be tested
//! against scripted servers.

mod jobs;

pub use jobs::{HttpJobRepository, JobRepository};
