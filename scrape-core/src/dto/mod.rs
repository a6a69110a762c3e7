//! Data Transfer Objects for the scrape server API
//!
//! Request and response bodies for the endpoints that are not progress
//! snapshots (those live in [`crate::domain::progress`]).

pub mod scrape;
