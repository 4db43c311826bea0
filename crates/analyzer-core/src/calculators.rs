//! Stateless network, numeric and CVSS calculators.

use crate::error::{AnalyzerError, Result};

// ── IPv4 ──────────────────────────────────────────────────────────────────────

/// Parse four dot-separated decimal octets in `0..=255`.
pub fn parse_ipv4(address: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = address.trim().split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(&parts) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(octets)
}

pub fn validate_ipv4(address: &str) -> bool {
    parse_ipv4(address).is_some()
}

/// Classful network class derived from the first octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkClass {
    A,
    B,
    C,
    D,
    E,
    Invalid,
}

impl NetworkClass {
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D (Multicast)",
            Self::E => "E (Reserved)",
            Self::Invalid => "Invalid",
        }
    }
}

pub fn network_class(first_octet: u8) -> NetworkClass {
    match first_octet {
        1..=127 => NetworkClass::A,
        128..=191 => NetworkClass::B,
        192..=223 => NetworkClass::C,
        224..=239 => NetworkClass::D,
        240..=255 => NetworkClass::E,
        _ => NetworkClass::Invalid,
    }
}

// ── Subnets ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetInfo {
    pub network_ip: String,
    pub prefix: u8,
    pub host_bits: u8,
    pub total_ips: u64,
    /// Zero for /31 and /32.
    pub usable_hosts: u64,
    pub first_octet: u8,
    pub network_class: NetworkClass,
}

pub fn subnet_info(network_ip: &str, prefix: u8) -> Result<SubnetInfo> {
    let octets = parse_ipv4(network_ip).ok_or_else(|| {
        AnalyzerError::InvalidInput(format!(
            "'{network_ip}' is not an IPv4 address (need 4 octets, each 0-255)"
        ))
    })?;
    if prefix > 32 {
        return Err(AnalyzerError::InvalidInput(format!(
            "subnet prefix /{prefix} must be between 0 and 32"
        )));
    }

    let host_bits = 32 - prefix;
    let total_ips = 1u64 << host_bits;
    let usable_hosts = if prefix >= 31 { 0 } else { total_ips - 2 };

    Ok(SubnetInfo {
        network_ip: network_ip.trim().to_string(),
        prefix,
        host_bits,
        total_ips,
        usable_hosts,
        first_octet: octets[0],
        network_class: network_class(octets[0]),
    })
}

// ── Hex ───────────────────────────────────────────────────────────────────────

/// Parse a base-16 string, with or without a `0x` prefix.
pub fn hex_to_decimal(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16)
        .map_err(|e| AnalyzerError::InvalidInput(format!("'{value}' is not hexadecimal: {e}")))
}

/// `255` -> `"0xff"`.
pub fn decimal_to_hex(value: u64) -> String {
    format!("{value:#x}")
}

// ── CVSS ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvssSeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
    Invalid,
}

impl CvssSeverity {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
            Self::Invalid => "INVALID",
        }
    }
}

/// CVSS v3 qualitative rating. Scores between 0.0 and 0.1 are `Invalid`.
pub fn cvss_severity(score: f64) -> CvssSeverity {
    if score == 0.0 {
        CvssSeverity::None
    } else if (9.0..=10.0).contains(&score) {
        CvssSeverity::Critical
    } else if (7.0..9.0).contains(&score) {
        CvssSeverity::High
    } else if (4.0..7.0).contains(&score) {
        CvssSeverity::Medium
    } else if (0.1..4.0).contains(&score) {
        CvssSeverity::Low
    } else {
        CvssSeverity::Invalid
    }
}

pub fn cvss_percentage(score: f64) -> f64 {
    (score / 10.0) * 100.0
}

pub fn validate_cvss(score: f64) -> bool {
    (0.0..=10.0).contains(&score)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
