//! Car routing log ingestion.
//!
//! Reads routing-service access logs, reconstructs the exact geometry of
//! every car route from its maneuver-level description, computes route
//! statistics, and stores the augmented records per city.

pub mod config;
pub mod geometry;
pub mod ingest;
pub mod record;
pub mod route;
pub mod sink;
pub mod stats;
