//! Normalisation of raw threat entries into [`ThreatRecord`]s.
//!
//! Everything here is total: an odd-shaped field degrades to its documented
//! default instead of failing the run.

use analyzer_core::models::{IndicatorItem, Indicators, Severity, ThreatRecord};
use serde_json::Value;

// ── Indicators ────────────────────────────────────────────────────────────────

/// Classify a raw `indicators` value into its [`Indicators`] shape.
pub fn classify_indicators(raw: Option<&Value>) -> Indicators {
    match raw {
        Some(Value::Object(map)) => match map.get("ips") {
            Some(inner) => Indicators::Wrapped(Box::new(classify_unwrapped(Some(inner)))),
            None => Indicators::Unrecognized,
        },
        other => classify_unwrapped(other),
    }
}

/// Shapes allowed inside an `ips` wrapper (no second level of wrapping).
fn classify_unwrapped(raw: Option<&Value>) -> Indicators {
    match raw {
        None | Some(Value::Null) => Indicators::Absent,
        Some(Value::String(s)) => Indicators::Single(s.clone()),
        Some(Value::Array(items)) => Indicators::List(items.iter().map(classify_item).collect()),
        Some(_) => Indicators::Unrecognized,
    }
}

fn classify_item(item: &Value) -> IndicatorItem {
    match item {
        Value::String(s) => IndicatorItem::Plain(s.clone()),
        Value::Object(map) => map
            .get("value")
            .and_then(scalar_text)
            .map(IndicatorItem::Tagged)
            .unwrap_or(IndicatorItem::Unrecognized),
        _ => IndicatorItem::Unrecognized,
    }
}

/// Indicator strings from any raw value, in document order.
pub fn extract_indicators(raw: Option<&Value>) -> Vec<String> {
    classify_indicators(raw).extract()
}

// ── Threats ───────────────────────────────────────────────────────────────────

/// Normalise one raw threat entry. Non-object entries yield all defaults.
pub fn normalize_threat(raw: &Value) -> ThreatRecord {
    let severity = match raw.get("severity") {
        Some(Value::String(label)) => Severity::from_label(label),
        _ => Severity::Unknown,
    };

    ThreatRecord {
        id: text_field(raw, "id", ThreatRecord::DEFAULT_ID),
        threat_type: text_field(raw, "type", ThreatRecord::DEFAULT_TYPE),
        description: text_field(raw, "description", ThreatRecord::DEFAULT_DESCRIPTION),
        severity,
        indicators: classify_indicators(raw.get("indicators")),
        active_exploit: raw
            .get("active_exploit")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn text_field(raw: &Value, key: &str, default: &str) -> String {
    raw.get(key)
        .and_then(scalar_text)
        .unwrap_or_else(|| default.to_string())
}

/// Strings as-is; numbers and booleans in their JSON spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
