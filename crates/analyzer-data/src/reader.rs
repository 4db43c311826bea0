//! Loaders for the two source artifacts.
//!
//! Firewall logs are read line by line into [`LogRecord`]s; threat feeds are
//! parsed whole into a [`ThreatFeed`] whose `threats` stay raw until the
//! extractor normalises them.

use std::io::BufRead;
use std::path::Path;

use analyzer_core::error::{AnalyzerError, Result};
use analyzer_core::models::{Action, LogRecord};
use serde_json::Value;
use tracing::debug;

/// Minimum whitespace-separated tokens for a usable log line.
pub const LOG_FIELD_COUNT: usize = 6;

// ── Firewall log ──────────────────────────────────────────────────────────────

/// Read a firewall log from disk.
///
/// Blank lines and lines with fewer than six tokens are skipped. A
/// non-numeric port fails the whole load with `MalformedInput`.
pub fn load_log_records(path: &Path) -> Result<Vec<LogRecord>> {
    let file = std::fs::File::open(path).map_err(|e| AnalyzerError::from_read(path, e))?;
    read_log_records(std::io::BufReader::new(file), path)
}

/// Same as [`load_log_records`] over any buffered reader; `path` is only
/// used for error context.
pub fn read_log_records<R: BufRead>(reader: R, path: &Path) -> Result<Vec<LogRecord>> {
    let mut records = Vec::new();
    let mut lines_read = 0usize;
    let mut lines_skipped = 0usize;

    for (index, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| AnalyzerError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        lines_read += 1;

        match parse_log_line(&line) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => lines_skipped += 1,
            Err(detail) => return Err(AnalyzerError::malformed_line(path, index + 1, detail)),
        }
    }

    debug!(
        "Log {}: {} lines read, {} skipped, {} records",
        path.display(),
        lines_read,
        lines_skipped,
        records.len()
    );

    Ok(records)
}

/// Parse one line: `date time ACTION source_ip dest_ip port [extra...]`.
///
/// Returns `Ok(None)` for blank or short lines and `Err` with a diagnostic
/// when the port token is not an integer port number.
pub fn parse_log_line(line: &str) -> std::result::Result<Option<LogRecord>, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < LOG_FIELD_COUNT {
        return Ok(None);
    }

    let port = parts[5]
        .parse::<u16>()
        .map_err(|e| format!("invalid port '{}': {}", parts[5], e))?;

    Ok(Some(LogRecord {
        date: parts[0].to_string(),
        time: parts[1].to_string(),
        action: Action::parse(parts[2]),
        source_ip: parts[3].to_string(),
        dest_ip: parts[4].to_string(),
        port,
    }))
}

// ── Threat feed ───────────────────────────────────────────────────────────────

/// A parsed threat-intelligence document. Threat entries are kept raw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreatFeed {
    pub feed_name: Option<String>,
    pub date: Option<String>,
    pub threats: Vec<Value>,
}

impl ThreatFeed {
    pub const UNKNOWN_FEED: &'static str = "Unknown Feed";
    pub const UNKNOWN_DATE: &'static str = "Unknown Date";

    /// Pick the known top-level fields out of a JSON document.
    ///
    /// Missing or wrongly-typed fields are treated as absent; a non-object
    /// document yields an empty feed.
    pub fn from_document(document: Value) -> Self {
        let Value::Object(mut map) = document else {
            return Self::default();
        };
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);

        let feed_name = text(map.get("feed_name"));
        let date = text(map.get("date"));
        let threats = match map.remove("threats") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        Self {
            feed_name,
            date,
            threats,
        }
    }

    pub fn name_or_default(&self) -> &str {
        self.feed_name.as_deref().unwrap_or(Self::UNKNOWN_FEED)
    }

    pub fn date_or_default(&self) -> &str {
        self.date.as_deref().unwrap_or(Self::UNKNOWN_DATE)
    }
}

/// Read and parse a JSON threat feed.
pub fn load_threat_feed(path: &Path) -> Result<ThreatFeed> {
    let content = std::fs::read_to_string(path).map_err(|e| AnalyzerError::from_read(path, e))?;
    let feed = parse_threat_feed(&content, path)?;
    debug!(
        "Feed {}: {} threats in '{}'",
        path.display(),
        feed.threats.len(),
        feed.name_or_default()
    );
    Ok(feed)
}

/// Parse feed text; `path` is only used for error context.
pub fn parse_threat_feed(content: &str, path: &Path) -> Result<ThreatFeed> {
    let document: Value =
        serde_json::from_str(content).map_err(|e| AnalyzerError::MalformedInput {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    Ok(ThreatFeed::from_document(document))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
