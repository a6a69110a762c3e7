//! Scrape Core
//!
//! Core types and pure logic for the scrape job tracker.
//!
//! This crate contains:
//! - Domain types: sessions, progress snapshots, normalized outcomes, job phases
//! - DTOs: request/response bodies exchanged with the scrape server
//! - Reconciliation: turning a terminal snapshot into exactly one outcome

pub mod domain;
pub mod dto;
pub mod reconcile;
