//! End-to-end pipeline scenarios: load → normalise → aggregate → render.

use std::path::Path;

use analyzer_core::lookup::PortNames;
use analyzer_core::models::Severity;
use analyzer_core::settings::ReportSink;
use analyzer_data::aggregator::SENTINEL;
use analyzer_data::analysis::{run_firewall, run_threats};
use analyzer_data::extractor::extract_indicators;
use analyzer_data::report::{emit_reports_to, render_firewall_text, render_json, RenderedReport};
use serde_json::json;
use tempfile::TempDir;

fn write_fixture(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ── Firewall ──────────────────────────────────────────────────────────────────

const MIXED_LOG: &str = "\
2024-01-15 08:00:01 ALLOW 192.168.1.10 10.0.0.5 22
2024-01-15 08:00:02 DENY 203.0.113.7 10.0.0.5 445
2024-01-15 08:00:03 ALLOW 192.168.1.11 10.0.0.5 80
2024-01-15 08:00:04 DENY 198.51.100.2 10.0.0.5 445
2024-01-15 08:00:05 ALLOW 192.168.1.12 10.0.0.5 443
";

#[test]
fn test_mixed_log_counts_and_top_port() {
    let tmp = TempDir::new().unwrap();
    let path = write_fixture(tmp.path(), "firewall.log", MIXED_LOG);

    let analysis = run_firewall(&path).unwrap().analysis;

    assert_eq!(analysis.total_entries, 5);
    assert_eq!(analysis.allow_count, 3);
    assert_eq!(analysis.deny_count, 2);
    assert_eq!(analysis.other_count, 0);
    assert_eq!(analysis.most_targeted_port, Some(445));
    assert_eq!(analysis.most_targeted_count, 2);
    assert_eq!(analysis.deny_percentage, 40.0);
    assert_eq!(
        analysis.denied_source_ips,
        vec!["198.51.100.2", "203.0.113.7"]
    );
    assert_eq!(analysis.time_range.first, "2024-01-15 08:00:01");
    assert_eq!(analysis.time_range.last, "2024-01-15 08:00:05");

    let value: serde_json::Value =
        serde_json::from_slice(&render_json(&analysis).unwrap()).unwrap();
    assert_eq!(value["allow_count"], 3);
    assert_eq!(value["deny_count"], 2);
    assert_eq!(value["other_count"], 0);
    assert_eq!(value["most_targeted_port"], 445);
    assert_eq!(value["most_targeted_count"], 2);
}

#[test]
fn test_mixed_log_text_report_names_service() {
    let tmp = TempDir::new().unwrap();
    let path = write_fixture(tmp.path(), "firewall.log", MIXED_LOG);

    let analysis = run_firewall(&path).unwrap().analysis;
    let lines = render_firewall_text(&analysis, &PortNames::default());

    assert!(lines.iter().any(|l| l == "Port: 445 (SMB)"));
    assert!(lines.iter().any(|l| l == "Denied 2 times"));
    assert!(lines.iter().any(|l| l.starts_with("DENY      : 2 entries (40.0%)")));
}

#[test]
fn test_empty_log() {
    let tmp = TempDir::new().unwrap();
    let path = write_fixture(tmp.path(), "empty.log", "");

    let analysis = run_firewall(&path).unwrap().analysis;

    assert_eq!(analysis.total_entries, 0);
    assert_eq!(analysis.allow_count, 0);
    assert_eq!(analysis.deny_count, 0);
    assert!(analysis.denied_source_ips.is_empty());
    assert_eq!(analysis.most_targeted_port, None);
    assert_eq!(analysis.deny_percentage, 0.0);
    assert_eq!(analysis.time_range.first, SENTINEL);
    assert_eq!(analysis.time_range.last, SENTINEL);

    let value: serde_json::Value =
        serde_json::from_slice(&render_json(&analysis).unwrap()).unwrap();
    assert_eq!(value["total_entries"], 0);
    assert_eq!(value["allow_count"], 0);
    assert_eq!(value["deny_count"], 0);
    assert_eq!(value["denied_source_ips"], json!([]));
    assert_eq!(value["time_range"], json!({"first": "N/A", "last": "N/A"}));
    assert_eq!(value["action_counts"]["ALLOW"], 0);
    assert_eq!(value["action_counts"]["DENY"], 0);
    assert_eq!(value["action_counts"]["OTHER"], 0);
    assert!(value["most_targeted_port"].is_null());
}

#[test]
fn test_counts_sum_to_total() {
    let tmp = TempDir::new().unwrap();
    let log = format!("{MIXED_LOG}2024-01-15 08:00:06 DROP 192.0.2.1 10.0.0.5 23\n\nshort line\n");
    let path = write_fixture(tmp.path(), "firewall.log", &log);

    let analysis = run_firewall(&path).unwrap().analysis;
    assert_eq!(analysis.total_entries, 6);
    assert_eq!(
        analysis.allow_count + analysis.deny_count + analysis.other_count,
        analysis.total_entries
    );
}

// ── Threats ───────────────────────────────────────────────────────────────────

#[test]
fn test_severity_buckets_and_critical_share() {
    let tmp = TempDir::new().unwrap();
    let feed = json!({
        "feed_name": "Scenario Feed",
        "date": "2024-01-15",
        "threats": [
            {"id": "T-1", "severity": "CRITICAL", "indicators": ["10.0.0.1", "10.0.0.2"]},
            {"id": "T-2", "severity": "LOW", "indicators": {"ips": [{"value": "10.0.0.2"}]}},
            {"id": "T-3", "severity": "critical", "active_exploit": true, "type": "rce"},
            {"id": "T-4", "severity": "bogus", "indicators": "10.0.0.9"}
        ]
    });
    let path = write_fixture(tmp.path(), "feed.json", &feed.to_string());

    let run = run_threats(&path).unwrap();
    let analysis = run.output.analysis;

    assert_eq!(analysis.total_threats, 4);
    assert_eq!(analysis.severity_counts.get(Severity::Critical), 2);
    assert_eq!(analysis.severity_counts.get(Severity::High), 0);
    assert_eq!(analysis.severity_counts.get(Severity::Medium), 0);
    assert_eq!(analysis.severity_counts.get(Severity::Low), 1);
    assert_eq!(analysis.severity_counts.get(Severity::Unknown), 1);
    assert_eq!(analysis.severity_counts.total(), analysis.total_threats);
    assert_eq!(analysis.critical_percentage, 50.0);

    assert_eq!(analysis.total_ips, 4);
    assert_eq!(analysis.unique_ips, vec!["10.0.0.1", "10.0.0.2", "10.0.0.9"]);
    assert_eq!(analysis.active_exploits.len(), 1);
    assert_eq!(analysis.active_exploits[0].id, "T-3");
}

#[test]
fn test_empty_feed_has_zero_filled_buckets() {
    let tmp = TempDir::new().unwrap();
    let path = write_fixture(tmp.path(), "feed.json", r#"{"threats": []}"#);

    let analysis = run_threats(&path).unwrap().output.analysis;
    assert_eq!(analysis.total_threats, 0);
    assert_eq!(analysis.critical_percentage, 0.0);

    let value: serde_json::Value =
        serde_json::from_slice(&render_json(&analysis).unwrap()).unwrap();
    let buckets = value["severity_counts"].as_object().unwrap();
    let keys: Vec<&str> = buckets.keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 5);
    for label in ["CRITICAL", "HIGH", "MEDIUM", "LOW", "UNKNOWN"] {
        assert_eq!(buckets[label], 0);
    }
}

#[test]
fn test_indicator_shapes() {
    assert_eq!(
        extract_indicators(Some(&json!(["1.1.1.1", "2.2.2.2"]))),
        vec!["1.1.1.1", "2.2.2.2"]
    );
    assert_eq!(
        extract_indicators(Some(&json!({"ips": [{"value": "3.3.3.3"}, "4.4.4.4"]}))),
        vec!["3.3.3.3", "4.4.4.4"]
    );
    assert_eq!(
        extract_indicators(Some(&json!([{"value": "5.5.5.5"}]))),
        vec!["5.5.5.5"]
    );
    assert_eq!(
        extract_indicators(Some(&json!({"ips": "9.9.9.9"}))),
        vec!["9.9.9.9"]
    );
    assert!(extract_indicators(Some(&json!({"unexpected": 1}))).is_empty());
    assert!(extract_indicators(Some(&json!({"domains": ["x"]}))).is_empty());
    assert!(extract_indicators(None).is_empty());
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn test_structured_output_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let path = write_fixture(tmp.path(), "firewall.log", MIXED_LOG);

    let first = render_json(&run_firewall(&path).unwrap().analysis).unwrap();
    let second = render_json(&run_firewall(&path).unwrap().analysis).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_notable_values_sorted_and_unique() {
    let tmp = TempDir::new().unwrap();
    let log = "\
2024-01-15 08:00:01 DENY 10.0.0.9 10.0.0.5 22
2024-01-15 08:00:02 DENY 10.0.0.1 10.0.0.5 22
2024-01-15 08:00:03 DENY 10.0.0.9 10.0.0.5 23
";
    let path = write_fixture(tmp.path(), "firewall.log", log);

    let ips = run_firewall(&path).unwrap().analysis.denied_source_ips;
    let mut expected = ips.clone();
    expected.sort();
    expected.dedup();
    assert_eq!(ips, expected);
    assert_eq!(ips, vec!["10.0.0.1", "10.0.0.9"]);
}

#[test]
fn test_emitted_reports_land_together() {
    let tmp = TempDir::new().unwrap();
    let path = write_fixture(tmp.path(), "firewall.log", MIXED_LOG);
    let analysis = run_firewall(&path).unwrap().analysis;

    let json_target = tmp.path().join("out").join("log_analysis.json");
    let reports = vec![
        RenderedReport::new(
            ReportSink::File(json_target.clone()),
            render_json(&analysis).unwrap(),
        ),
        RenderedReport::new(ReportSink::Stdout, b"summary\n".to_vec()),
    ];

    let mut stdout = Vec::new();
    emit_reports_to(&reports, &mut stdout).unwrap();

    assert_eq!(stdout, b"summary\n");
    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&json_target).unwrap()).unwrap();
    assert_eq!(written["total_entries"], 5);
}
