//! Structured and text renderings of an analysis, plus all-or-nothing
//! emission to report sinks.
//!
//! Rendering is pure: every function here maps an analysis (and whatever
//! static data it needs) to bytes or lines. Only [`emit_reports`] touches the
//! filesystem.

use std::io::Write;
use std::path::PathBuf;

use analyzer_core::error::{AnalyzerError, Result};
use analyzer_core::formatting::{format_count, format_percent, ratio_percent};
use analyzer_core::lookup::PortNames;
use analyzer_core::models::Category;
use analyzer_core::settings::ReportSink;
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregator::{FirewallAnalysis, ThreatAnalysis};
use crate::inventory::InventoryAnalysis;
use crate::reader::ThreatFeed;

/// Width of the `=` and `-` borders.
pub const REPORT_WIDTH: usize = 70;

// ── Structured ────────────────────────────────────────────────────────────────

/// Pretty-printed JSON followed by a newline.
pub fn render_json<T: Serialize>(analysis: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(analysis)?;
    bytes.push(b'\n');
    Ok(bytes)
}

// ── Text helpers ──────────────────────────────────────────────────────────────

fn banner(lines: &mut Vec<String>, title: &str) {
    lines.push("=".repeat(REPORT_WIDTH));
    lines.push(title.to_string());
    lines.push("=".repeat(REPORT_WIDTH));
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push("-".repeat(REPORT_WIDTH));
    lines.push(title.to_string());
    lines.push("-".repeat(REPORT_WIDTH));
}

fn footer(lines: &mut Vec<String>) {
    banner(lines, "END OF REPORT");
}

/// Join rendered lines into the bytes written to a sink.
pub fn lines_to_bytes(lines: &[String]) -> Vec<u8> {
    let mut text = lines.join("\n");
    text.push('\n');
    text.into_bytes()
}

// ── Firewall ──────────────────────────────────────────────────────────────────

pub fn render_firewall_text(analysis: &FirewallAnalysis, ports: &PortNames) -> Vec<String> {
    let mut lines = Vec::new();
    let total = analysis.total_entries;

    banner(&mut lines, "FIREWALL LOG ANALYSIS SUMMARY");
    lines.push(String::new());

    section(&mut lines, "SUMMARY");
    lines.push(format!("Total Log Entries: {}", format_count(total)));
    lines.push(String::new());

    section(&mut lines, "ACTION BREAKDOWN");
    for (category, count) in analysis.action_counts.iter() {
        lines.push(format!(
            "{:10}: {} entries ({})",
            category.label(),
            format_count(count),
            format_percent(ratio_percent(count, total))
        ));
    }
    lines.push(String::new());

    section(&mut lines, "DENIED SOURCE IPS");
    lines.push(format!(
        "Unique denied source IPs: {}",
        analysis.denied_source_ips.len()
    ));
    if analysis.denied_source_ips.is_empty() {
        lines.push("  (No denied source IPs)".to_string());
    } else {
        for ip in &analysis.denied_source_ips {
            lines.push(format!("  - {ip}"));
        }
    }
    lines.push(String::new());

    section(&mut lines, "MOST TARGETED PORT");
    match analysis.most_targeted_port {
        Some(port) => {
            lines.push(format!("Port: {} ({})", port, ports.service_name(port)));
            lines.push(format!(
                "Denied {} times",
                format_count(analysis.most_targeted_count)
            ));
        }
        None => lines.push("  (No denied traffic)".to_string()),
    }
    lines.push(String::new());

    section(&mut lines, "TIME RANGE");
    lines.push(format!("First entry: {}", analysis.time_range.first));
    lines.push(format!("Last entry:  {}", analysis.time_range.last));
    lines.push(String::new());

    footer(&mut lines);
    lines
}

// ── Threats ───────────────────────────────────────────────────────────────────

pub fn render_threat_text(
    analysis: &ThreatAnalysis,
    feed: &ThreatFeed,
    generated_at: &DateTime<Local>,
) -> Vec<String> {
    let mut lines = Vec::new();

    banner(&mut lines, "THREAT INTELLIGENCE ANALYSIS REPORT");
    lines.push(format!("Feed: {}", feed.name_or_default()));
    lines.push(format!("Date: {}", feed.date_or_default()));
    lines.push(format!(
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(String::new());

    section(&mut lines, "SUMMARY STATISTICS");
    lines.push(format!(
        "Total Threats: {}",
        format_count(analysis.total_threats)
    ));
    lines.push(format!(
        "Total Malicious IPs (raw count): {}",
        format_count(analysis.total_ips)
    ));
    lines.push(format!(
        "Unique IPs: {}",
        format_count(analysis.unique_ips.len())
    ));
    lines.push(format!(
        "Active Exploits: {}",
        format_count(analysis.active_exploits.len())
    ));
    lines.push(String::new());

    section(&mut lines, "SEVERITY BREAKDOWN");
    for (severity, count) in analysis.severity_counts.iter() {
        lines.push(format!("{:10}: {} threats", severity.label(), count));
    }
    lines.push(String::new());
    lines.push(format!(
        "CRITICAL threats: {}",
        format_percent(analysis.critical_percentage)
    ));
    lines.push(String::new());

    section(&mut lines, "MALICIOUS IP ADDRESSES");
    if analysis.unique_ips.is_empty() {
        lines.push("  (No IPs found)".to_string());
    } else {
        for ip in &analysis.unique_ips {
            lines.push(format!("  - {ip}"));
        }
    }
    lines.push(String::new());

    section(&mut lines, "ACTIVE EXPLOITS (IMMEDIATE ATTENTION REQUIRED)");
    if analysis.active_exploits.is_empty() {
        lines.push("  (No active exploits found)".to_string());
    } else {
        for exploit in &analysis.active_exploits {
            lines.push(String::new());
            lines.push(format!(
                "{} ({})",
                exploit.id,
                exploit.threat_type.to_uppercase()
            ));
            lines.push(format!("  Description: {}", exploit.description));
        }
    }
    lines.push(String::new());

    footer(&mut lines);
    lines
}

// ── Inventory ─────────────────────────────────────────────────────────────────

pub fn render_inventory_text(analysis: &InventoryAnalysis) -> Vec<String> {
    let mut lines = Vec::new();

    banner(&mut lines, "DIRECTORY INVENTORY REPORT");
    lines.push(format!("Directory: {}", analysis.source_directory));
    lines.push(String::new());

    section(&mut lines, "SUMMARY");
    lines.push(format!(
        "Total files processed: {}",
        format_count(analysis.total_files)
    ));
    lines.push(String::new());

    section(&mut lines, "CATEGORY BREAKDOWN");
    for (category, count) in analysis.statistics.iter() {
        lines.push(format!(
            "{}: {} files ({})",
            category.label(),
            format_count(count),
            format_percent(ratio_percent(count, analysis.total_files))
        ));
    }
    lines.push(String::new());

    section(&mut lines, "ERRORS");
    if analysis.errors.is_empty() {
        lines.push("None".to_string());
    } else {
        for error in &analysis.errors {
            lines.push(error.clone());
        }
    }
    lines.push(String::new());

    footer(&mut lines);
    lines
}

// ── Emission ──────────────────────────────────────────────────────────────────

/// One rendered report and where it goes.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub sink: ReportSink,
    pub bytes: Vec<u8>,
}

impl RenderedReport {
    pub fn new(sink: ReportSink, bytes: Vec<u8>) -> Self {
        Self { sink, bytes }
    }
}

/// Write every report or none, with stdout as the standard output sink.
pub fn emit_reports(reports: &[RenderedReport]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    emit_reports_to(reports, &mut handle)
}

/// Write every report or none.
///
/// File sinks are staged next to their target as `<name>.tmp`. Once every
/// one has staged, each existing target is moved aside to `<name>.bak` and
/// the staged file renamed into place; stdout sinks are written last. A
/// failure at any point removes staged files, undoes the renames already
/// made (restoring the backups) and returns `WriteFailure`. Backups are
/// deleted only after every sink succeeded.
pub fn emit_reports_to<W: Write>(reports: &[RenderedReport], stdout: &mut W) -> Result<()> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();

    for report in reports {
        let ReportSink::File(target) = &report.sink else {
            continue;
        };
        let tmp = sibling_path(target, "tmp");
        if let Err(e) = stage_file(&tmp, &report.bytes) {
            discard_staged(&staged);
            let _ = std::fs::remove_file(&tmp);
            return Err(AnalyzerError::WriteFailure {
                path: target.clone(),
                source: e,
            });
        }
        staged.push((tmp, target.clone()));
    }

    let mut committed: Vec<Committed> = Vec::new();
    for (index, (tmp, target)) in staged.iter().enumerate() {
        match commit_file(tmp, target) {
            Ok(entry) => {
                debug!("Wrote report {}", target.display());
                committed.push(entry);
            }
            Err(e) => {
                discard_staged(&staged[index..]);
                roll_back(&committed);
                return Err(AnalyzerError::WriteFailure {
                    path: target.clone(),
                    source: e,
                });
            }
        }
    }

    for report in reports {
        if report.sink != ReportSink::Stdout {
            continue;
        }
        if let Err(e) = stdout.write_all(&report.bytes).and_then(|_| stdout.flush()) {
            roll_back(&committed);
            return Err(AnalyzerError::WriteFailure {
                path: PathBuf::from("<stdout>"),
                source: e,
            });
        }
    }

    for entry in &committed {
        if let Some(backup) = &entry.backup {
            if let Err(e) = std::fs::remove_file(backup) {
                warn!("Could not remove backup {}: {}", backup.display(), e);
            }
        }
    }

    Ok(())
}

/// A report renamed into place, with the previous file if there was one.
struct Committed {
    target: PathBuf,
    backup: Option<PathBuf>,
}

/// `report.json` -> `report.json.<suffix>` in the same directory.
fn sibling_path(target: &std::path::Path, suffix: &str) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    target.with_file_name(name)
}

fn stage_file(tmp: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = tmp.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(tmp, bytes)
}

/// Move an existing regular file at `target` aside, then rename `tmp` onto
/// it. On failure the backup is put back before returning.
fn commit_file(tmp: &std::path::Path, target: &std::path::Path) -> std::io::Result<Committed> {
    let backup = if target.is_file() {
        let backup = sibling_path(target, "bak");
        std::fs::rename(target, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = std::fs::rename(tmp, target) {
        if let Some(backup) = &backup {
            restore_backup(backup, target);
        }
        return Err(e);
    }

    Ok(Committed {
        target: target.to_path_buf(),
        backup,
    })
}

/// Undo commits in reverse order.
fn roll_back(committed: &[Committed]) {
    for entry in committed.iter().rev() {
        if let Err(e) = std::fs::remove_file(&entry.target) {
            warn!("Could not remove report {}: {}", entry.target.display(), e);
        }
        if let Some(backup) = &entry.backup {
            restore_backup(backup, &entry.target);
        }
    }
}

fn restore_backup(backup: &std::path::Path, target: &std::path::Path) {
    if let Err(e) = std::fs::rename(backup, target) {
        warn!(
            "Could not restore {} from {}: {}",
            target.display(),
            backup.display(),
            e
        );
    }
}

fn discard_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = std::fs::remove_file(tmp) {
            warn!("Could not remove staged report {}: {}", tmp.display(), e);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
