//! Top-level pipeline entry points.
//!
//! Each `run_*` function loads one artifact, normalises and aggregates it in
//! a single pass, and returns the analysis ready for the reporters. Nothing
//! here writes reports.

use std::path::Path;
use std::time::Instant;

use analyzer_core::error::Result;
use analyzer_core::lookup::CategoryTable;
use tracing::{debug, info};

use crate::aggregator::{analyze_logs, analyze_threats, FirewallAnalysis, ThreatAnalysis};
use crate::extractor::normalize_threat;
use crate::inventory::{aggregate_inventory, list_files, InventoryAnalysis};
use crate::reader::{load_log_records, load_threat_feed, ThreatFeed};

/// Bookkeeping about one run. Logged, never serialised into reports.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    /// Number of records that reached the aggregator.
    pub records_processed: usize,
    /// Wall-clock seconds spent loading the artifact.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent normalising and aggregating.
    pub aggregate_time_seconds: f64,
}

/// Analysis plus run metadata.
#[derive(Debug, Clone)]
pub struct PipelineOutput<T> {
    pub analysis: T,
    pub metadata: RunMetadata,
}

/// Threat analysis keeps the feed header around for the text report.
#[derive(Debug, Clone)]
pub struct ThreatRun {
    pub feed: ThreatFeed,
    pub output: PipelineOutput<ThreatAnalysis>,
}

pub fn run_firewall(path: &Path) -> Result<PipelineOutput<FirewallAnalysis>> {
    info!("Reading firewall log {}", path.display());
    let load_start = Instant::now();
    let records = load_log_records(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let aggregate_start = Instant::now();
    let analysis = analyze_logs(&records);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let metadata = RunMetadata {
        records_processed: records.len(),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };
    debug!("Firewall run: {:?}", metadata);
    info!(
        "Parsed {} log entries ({} denied)",
        analysis.total_entries,
        analysis.deny_count
    );

    Ok(PipelineOutput { analysis, metadata })
}

pub fn run_threats(path: &Path) -> Result<ThreatRun> {
    info!("Loading threat feed {}", path.display());
    let load_start = Instant::now();
    let feed = load_threat_feed(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let aggregate_start = Instant::now();
    let analysis = analyze_threats(feed.threats.iter().map(normalize_threat));
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let metadata = RunMetadata {
        records_processed: feed.threats.len(),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };
    debug!("Threat run: {:?}", metadata);
    info!(
        "Loaded {} threats from {}",
        analysis.total_threats,
        feed.name_or_default()
    );

    Ok(ThreatRun {
        feed,
        output: PipelineOutput { analysis, metadata },
    })
}

pub fn run_inventory(
    dir: &Path,
    table: &CategoryTable,
) -> Result<PipelineOutput<InventoryAnalysis>> {
    info!("Scanning directory {}", dir.display());
    let load_start = Instant::now();
    let listing = list_files(dir)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let aggregate_start = Instant::now();
    let records_processed = listing.file_names.len();
    let analysis = aggregate_inventory(dir, listing, table);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let metadata = RunMetadata {
        records_processed,
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };
    debug!("Inventory run: {:?}", metadata);

    Ok(PipelineOutput { analysis, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
