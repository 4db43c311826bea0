//! Ingest → aggregate → report pipelines.
//!
//! Loads firewall logs, threat-intelligence feeds and directory listings,
//! normalises them into records, aggregates summary statistics in one pass
//! and renders the results as JSON and fixed-width text.

pub mod aggregator;
pub mod analysis;
pub mod extractor;
pub mod inventory;
pub mod reader;
pub mod report;

pub use analyzer_core as core;
