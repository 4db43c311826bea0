//! Short bordered reports for the calculator subcommands and the report
//! pipelines that back `firewall`, `threats` and `inventory`.

use std::path::Path;

use analyzer_core::calculators::{
    cvss_percentage, cvss_severity, decimal_to_hex, hex_to_decimal, subnet_info, validate_cvss,
    validate_ipv4,
};
use analyzer_core::formatting::{format_count, format_number};
use analyzer_core::lookup::{CategoryTable, PortNames};
use analyzer_core::password::check_password_strength;
use analyzer_core::settings::{Command, ReportSink, ReportTargets};
use analyzer_data::analysis::{run_firewall, run_inventory, run_threats};
use analyzer_data::report::{
    emit_reports, lines_to_bytes, render_firewall_text, render_inventory_text, render_json,
    render_threat_text, RenderedReport,
};
use anyhow::{Context, Result};
use chrono::Local;

const CALC_WIDTH: usize = 55;

fn bordered(title: &str, body: Vec<String>) -> Vec<String> {
    let mut lines = Vec::with_capacity(body.len() + 4);
    lines.push("=".repeat(CALC_WIDTH));
    lines.push(title.to_string());
    lines.push("=".repeat(CALC_WIDTH));
    lines.extend(body);
    lines.push("=".repeat(CALC_WIDTH));
    lines
}

// ── Pipelines ─────────────────────────────────────────────────────────────────

fn sinks(command: &Command, targets: &ReportTargets, output_dir: &Path) -> (ReportSink, ReportSink) {
    let defaults = command.default_targets().unwrap_or(("-", "-"));
    targets.resolve(defaults, output_dir)
}

fn emit_pair(json: (ReportSink, Vec<u8>), text: (ReportSink, Vec<u8>)) -> Result<()> {
    let summary = format!("JSON -> {}, text -> {}", json.0, text.0);
    let reports = [
        RenderedReport::new(json.0, json.1),
        RenderedReport::new(text.0, text.1),
    ];
    emit_reports(&reports).context("Failed to write reports")?;
    tracing::info!("Reports written: {}", summary);
    Ok(())
}

pub fn firewall(
    command: &Command,
    log: &Path,
    targets: &ReportTargets,
    output_dir: &Path,
) -> Result<()> {
    let (json_sink, text_sink) = sinks(command, targets, output_dir);
    let output = run_firewall(log)
        .with_context(|| format!("Firewall analysis of {} failed", log.display()))?;

    let json = render_json(&output.analysis)?;
    let text = lines_to_bytes(&render_firewall_text(
        &output.analysis,
        &PortNames::default(),
    ));
    emit_pair((json_sink, json), (text_sink, text))
}

pub fn threats(
    command: &Command,
    feed: &Path,
    targets: &ReportTargets,
    output_dir: &Path,
) -> Result<()> {
    let (json_sink, text_sink) = sinks(command, targets, output_dir);
    let run = run_threats(feed)
        .with_context(|| format!("Threat analysis of {} failed", feed.display()))?;

    let json = render_json(&run.output.analysis)?;
    let text = lines_to_bytes(&render_threat_text(
        &run.output.analysis,
        &run.feed,
        &Local::now(),
    ));
    emit_pair((json_sink, json), (text_sink, text))
}

pub fn inventory(
    command: &Command,
    dir: &Path,
    targets: &ReportTargets,
    output_dir: &Path,
) -> Result<()> {
    let (json_sink, text_sink) = sinks(command, targets, output_dir);
    let output = run_inventory(dir, &CategoryTable::default())
        .with_context(|| format!("Inventory of {} failed", dir.display()))?;

    let json = render_json(&output.analysis)?;
    let text = lines_to_bytes(&render_inventory_text(&output.analysis));
    emit_pair((json_sink, json), (text_sink, text))
}

// ── Calculators ───────────────────────────────────────────────────────────────

pub fn ip_check_report(addresses: &[String]) -> Vec<String> {
    let body = addresses
        .iter()
        .map(|ip| {
            let verdict = if validate_ipv4(ip) { "VALID" } else { "INVALID" };
            format!("IP: {ip:<15} -> {verdict}")
        })
        .collect();
    bordered("IP Address Validator", body)
}

pub fn subnet_report(network_ip: &str, prefix: u8) -> Result<Vec<String>> {
    let info = subnet_info(network_ip, prefix)?;
    let body = vec![
        format!("Network IP:      {}", info.network_ip),
        format!("Subnet Mask:     /{}", info.prefix),
        format!("Host Bits:       {}", info.host_bits),
        format!("Total IPs:       {}", format_count(info.total_ips as usize)),
        format!("Usable Hosts:    {}", format_count(info.usable_hosts as usize)),
        format!("First Octet:     {}", info.first_octet),
        format!("Network Class:   {}", info.network_class.label()),
    ];
    Ok(bordered("Network Subnet Calculator Report", body))
}

/// Invalid values get an error line; the rest are still converted.
pub fn hex_report(values: &[String]) -> Vec<String> {
    let body = values
        .iter()
        .map(|value| match hex_to_decimal(value) {
            Ok(decimal) => format!(
                "Hex {value} -> Decimal {decimal} -> Back to Hex {}",
                decimal_to_hex(decimal)
            ),
            Err(e) => format!("[ERROR] {e}"),
        })
        .collect();
    bordered("Hex Address Converter", body)
}

pub fn cvss_report(score: f64, id: &str, description: &str) -> Result<Vec<String>> {
    if !validate_cvss(score) {
        anyhow::bail!("Invalid CVSS score: {score}. Must be 0.0 to 10.0");
    }
    let body = vec![
        format!("Vulnerability ID:   {id}"),
        format!("Description:        {description}"),
        format!("CVSS Score:         {score:.1} / 10.0"),
        format!(
            "Score Percentage:   {}%",
            format_number(cvss_percentage(score), 2)
        ),
        format!("Severity Category:  {}", cvss_severity(score).label()),
    ];
    Ok(bordered("CVSS Vulnerability Report", body))
}

/// Passwords are never echoed back; entries are numbered instead.
pub fn password_report(passwords: &[String]) -> Vec<String> {
    let mut body = Vec::new();
    for (index, password) in passwords.iter().enumerate() {
        let verdict = check_password_strength(password);
        body.push(format!("Password #{}: {}", index + 1, verdict.strength.label()));
        for advice in &verdict.feedback {
            body.push(format!("  - {advice}"));
        }
    }
    bordered("Password Strength Checker", body)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
