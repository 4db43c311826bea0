//! Single-pass aggregation of normalised records into summary statistics.

use std::collections::HashMap;
use std::hash::Hash;

use analyzer_core::formatting::ratio_percent;
use analyzer_core::models::{
    Action, ActionCategory, CategoryCounts, LogRecord, Severity, ThreatRecord,
};
use serde::Serialize;

/// Placeholder for markers that have no data behind them.
pub const SENTINEL: &str = "N/A";

// ── FrequencyCounter ──────────────────────────────────────────────────────────

/// Multiset that remembers first-seen order.
///
/// [`FrequencyCounter::most_common`] breaks ties in favour of the key seen
/// first.
#[derive(Debug, Clone)]
pub struct FrequencyCounter<K> {
    counts: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> FrequencyCounter<K> {
    pub fn new() -> Self {
        Self {
            counts: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Highest-count key with its count, or `None` when empty.
    pub fn most_common(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (key, count) in &self.counts {
            if best.map_or(true, |(_, n)| *count > n) {
                best = Some((key, *count));
            }
        }
        best
    }
}

impl<K: Eq + Hash + Clone> Default for FrequencyCounter<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort ascending and drop duplicates.
fn sorted_unique(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

// ── TimeRange ─────────────────────────────────────────────────────────────────

/// First and last markers in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub first: String,
    pub last: String,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            first: SENTINEL.to_string(),
            last: SENTINEL.to_string(),
        }
    }
}

// ── Firewall ──────────────────────────────────────────────────────────────────

/// Summary of one firewall log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirewallAnalysis {
    pub total_entries: usize,
    pub allow_count: usize,
    pub deny_count: usize,
    pub other_count: usize,
    /// The same three counts keyed by category label.
    pub action_counts: CategoryCounts<ActionCategory>,
    pub deny_percentage: f64,
    /// Sorted, de-duplicated.
    pub denied_source_ips: Vec<String>,
    pub most_targeted_port: Option<u16>,
    pub most_targeted_count: usize,
    pub time_range: TimeRange,
}

/// Running state for [`FirewallAnalysis`].
#[derive(Debug, Default)]
pub struct FirewallAggregator {
    total: usize,
    action_counts: CategoryCounts<ActionCategory>,
    denied_ips: Vec<String>,
    denied_ports: FrequencyCounter<u16>,
    first: Option<String>,
    last: Option<String>,
}

impl FirewallAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: &LogRecord) {
        self.total += 1;
        self.action_counts.increment(record.action.category());

        if record.action == Action::Deny {
            self.denied_ips.push(record.source_ip.clone());
            self.denied_ports.add(record.port);
        }

        let marker = record.timestamp();
        if self.first.is_none() {
            self.first = Some(marker.clone());
        }
        self.last = Some(marker);
    }

    pub fn finish(self) -> FirewallAnalysis {
        let (most_targeted_port, most_targeted_count) = match self.denied_ports.most_common() {
            Some((port, count)) => (Some(*port), count),
            None => (None, 0),
        };
        let deny_count = self.action_counts.get(ActionCategory::Deny);

        FirewallAnalysis {
            total_entries: self.total,
            allow_count: self.action_counts.get(ActionCategory::Allow),
            deny_count,
            other_count: self.action_counts.get(ActionCategory::Other),
            deny_percentage: ratio_percent(deny_count, self.total),
            action_counts: self.action_counts,
            denied_source_ips: sorted_unique(self.denied_ips),
            most_targeted_port,
            most_targeted_count,
            time_range: TimeRange {
                first: self.first.unwrap_or_else(|| SENTINEL.to_string()),
                last: self.last.unwrap_or_else(|| SENTINEL.to_string()),
            },
        }
    }
}

/// Aggregate `records` in order.
pub fn analyze_logs<'a>(records: impl IntoIterator<Item = &'a LogRecord>) -> FirewallAnalysis {
    let mut aggregator = FirewallAggregator::new();
    for record in records {
        aggregator.add_record(record);
    }
    aggregator.finish()
}

// ── Threats ───────────────────────────────────────────────────────────────────

/// An actively exploited threat, as listed in the reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveExploit {
    pub id: String,
    #[serde(rename = "type")]
    pub threat_type: String,
    pub description: String,
}

/// Summary of one threat feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatAnalysis {
    pub total_threats: usize,
    pub severity_counts: CategoryCounts<Severity>,
    /// Sorted, de-duplicated.
    pub unique_ips: Vec<String>,
    /// Indicator count before de-duplication.
    pub total_ips: usize,
    /// In feed order.
    pub active_exploits: Vec<ActiveExploit>,
    pub critical_percentage: f64,
}

/// Running state for [`ThreatAnalysis`].
#[derive(Debug, Default)]
pub struct ThreatAggregator {
    total: usize,
    severity_counts: CategoryCounts<Severity>,
    ips: Vec<String>,
    active_exploits: Vec<ActiveExploit>,
}

impl ThreatAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: ThreatRecord) {
        self.total += 1;
        self.severity_counts.increment(record.severity);
        self.ips.extend(record.indicators.extract());

        if record.active_exploit {
            self.active_exploits.push(ActiveExploit {
                id: record.id,
                threat_type: record.threat_type,
                description: record.description,
            });
        }
    }

    pub fn finish(self) -> ThreatAnalysis {
        let critical = self.severity_counts.get(Severity::Critical);
        ThreatAnalysis {
            total_threats: self.total,
            critical_percentage: ratio_percent(critical, self.total),
            severity_counts: self.severity_counts,
            total_ips: self.ips.len(),
            unique_ips: sorted_unique(self.ips),
            active_exploits: self.active_exploits,
        }
    }
}

/// Aggregate normalised threats in order.
pub fn analyze_threats(records: impl IntoIterator<Item = ThreatRecord>) -> ThreatAnalysis {
    let mut aggregator = ThreatAggregator::new();
    for record in records {
        aggregator.add_record(record);
    }
    aggregator.finish()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_core::models::Indicators;

    fn log(time: &str, action: &str, src: &str, port: u16) -> LogRecord {
        LogRecord {
            date: "2024-01-15".to_string(),
            time: time.to_string(),
            action: Action::parse(action),
            source_ip: src.to_string(),
            dest_ip: "10.0.0.1".to_string(),
            port,
        }
    }

    fn threat(severity: Severity, ips: &[&str], active: bool) -> ThreatRecord {
        ThreatRecord {
            id: "T".to_string(),
            severity,
            indicators: Indicators::List(
                ips.iter()
                    .map(|ip| analyzer_core::models::IndicatorItem::Plain(ip.to_string()))
                    .collect(),
            ),
            active_exploit: active,
            ..ThreatRecord::default()
        }
    }

    // ── FrequencyCounter ──────────────────────────────────────────────────────

    #[test]
    fn test_frequency_counter_most_common() {
        let mut counter = FrequencyCounter::new();
        for port in [22u16, 445, 445, 80] {
            counter.add(port);
        }
        assert_eq!(counter.most_common(), Some((&445, 2)));
    }

    #[test]
    fn test_frequency_counter_tie_prefers_first_seen() {
        let mut counter = FrequencyCounter::new();
        for port in [3389u16, 22, 22, 3389] {
            counter.add(port);
        }
        assert_eq!(counter.most_common(), Some((&3389, 2)));
    }

    #[test]
    fn test_frequency_counter_empty() {
        let counter: FrequencyCounter<u16> = FrequencyCounter::new();
        assert!(counter.is_empty());
        assert_eq!(counter.most_common(), None);
    }

    // ── analyze_logs ──────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_logs_counts_and_port() {
        let records = vec![
            log("10:00:00", "ALLOW", "10.0.0.2", 443),
            log("10:01:00", "DENY", "203.0.113.7", 445),
            log("10:02:00", "allow", "10.0.0.3", 80),
            log("10:03:00", "DENY", "198.51.100.1", 445),
            log("10:04:00", "DENY", "203.0.113.7", 22),
            log("10:05:00", "DROP", "10.0.0.4", 53),
        ];
        let analysis = analyze_logs(&records);

        assert_eq!(analysis.total_entries, 6);
        assert_eq!(analysis.allow_count, 2);
        assert_eq!(analysis.deny_count, 3);
        assert_eq!(analysis.other_count, 1);
        assert_eq!(analysis.most_targeted_port, Some(445));
        assert_eq!(analysis.most_targeted_count, 2);
        assert_eq!(
            analysis.denied_source_ips,
            vec!["198.51.100.1", "203.0.113.7"]
        );
        assert!((analysis.deny_percentage - 50.0).abs() < 1e-9);
        assert_eq!(analysis.time_range.first, "2024-01-15 10:00:00");
        assert_eq!(analysis.time_range.last, "2024-01-15 10:05:00");
    }

    #[test]
    fn test_analyze_logs_counts_sum_to_total() {
        let records = vec![
            log("1", "ALLOW", "a", 1),
            log("2", "REJECT", "b", 2),
            log("3", "DENY", "c", 3),
            log("4", "LOG", "d", 4),
        ];
        let analysis = analyze_logs(&records);
        assert_eq!(
            analysis.allow_count + analysis.deny_count + analysis.other_count,
            analysis.total_entries
        );
    }

    #[test]
    fn test_analyze_logs_empty() {
        let analysis = analyze_logs(std::iter::empty());
        assert_eq!(analysis.total_entries, 0);
        assert_eq!(analysis.allow_count, 0);
        assert_eq!(analysis.deny_count, 0);
        assert!(analysis.denied_source_ips.is_empty());
        assert_eq!(analysis.most_targeted_port, None);
        assert_eq!(analysis.most_targeted_count, 0);
        assert_eq!(analysis.deny_percentage, 0.0);
        assert_eq!(analysis.time_range, TimeRange::default());
        assert_eq!(analysis.time_range.first, "N/A");
    }

    #[test]
    fn test_analyze_logs_denied_ips_sorted_regardless_of_order() {
        let forward = vec![
            log("1", "DENY", "10.0.0.9", 1),
            log("2", "DENY", "10.0.0.10", 1),
            log("3", "DENY", "10.0.0.9", 1),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = analyze_logs(&forward);
        let b = analyze_logs(&reversed);
        assert_eq!(a.denied_source_ips, vec!["10.0.0.10", "10.0.0.9"]);
        assert_eq!(a.denied_source_ips, b.denied_source_ips);
    }

    // ── analyze_threats ───────────────────────────────────────────────────────

    #[test]
    fn test_analyze_threats_counts() {
        let records = vec![
            threat(Severity::Critical, &["1.1.1.1", "2.2.2.2"], true),
            threat(Severity::Low, &["2.2.2.2"], false),
            threat(Severity::Critical, &[], false),
            threat(Severity::Unknown, &["0.0.0.1"], true),
        ];
        let analysis = analyze_threats(records);

        assert_eq!(analysis.total_threats, 4);
        assert_eq!(analysis.severity_counts.get(Severity::Critical), 2);
        assert_eq!(analysis.severity_counts.get(Severity::High), 0);
        assert_eq!(analysis.severity_counts.get(Severity::Low), 1);
        assert_eq!(analysis.severity_counts.get(Severity::Unknown), 1);
        assert_eq!(analysis.total_ips, 4);
        assert_eq!(analysis.unique_ips, vec!["0.0.0.1", "1.1.1.1", "2.2.2.2"]);
        assert_eq!(analysis.active_exploits.len(), 2);
        assert!((analysis.critical_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_threats_empty() {
        let analysis = analyze_threats(std::iter::empty());
        assert_eq!(analysis.total_threats, 0);
        assert_eq!(analysis.critical_percentage, 0.0);
        assert!(analysis.unique_ips.is_empty());
        assert_eq!(analysis.severity_counts.iter().count(), 5);
    }

    #[test]
    fn test_active_exploit_serialises_type_key() {
        let exploit = ActiveExploit {
            id: "CVE-1".to_string(),
            threat_type: "rce".to_string(),
            description: "d".to_string(),
        };
        let json = serde_json::to_value(&exploit).unwrap();
        assert_eq!(json["type"], "rce");
    }
}
