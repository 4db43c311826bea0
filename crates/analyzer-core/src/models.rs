use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ── Category tables ───────────────────────────────────────────────────────────

/// A closed set of labels that a pipeline counts records into.
///
/// `ALL` fixes the canonical order used for seeding, iteration and
/// serialisation.
pub trait Category: Copy + Eq + 'static {
    const ALL: &'static [Self];

    /// The label used in both report renderings.
    fn label(self) -> &'static str;
}

/// Per-category running counts, seeded with every category at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts<C: Category> {
    counts: Vec<(C, usize)>,
}

impl<C: Category> CategoryCounts<C> {
    pub fn new() -> Self {
        Self {
            counts: C::ALL.iter().map(|&c| (c, 0)).collect(),
        }
    }

    pub fn increment(&mut self, category: C) {
        if let Some(slot) = self.counts.iter_mut().find(|(c, _)| *c == category) {
            slot.1 += 1;
        }
    }

    pub fn get(&self, category: C) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Sum over all categories.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Iterate in canonical order, including zero entries.
    pub fn iter(&self) -> impl Iterator<Item = (C, usize)> + '_ {
        self.counts.iter().copied()
    }
}

impl<C: Category> Default for CategoryCounts<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> Serialize for CategoryCounts<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (category, count) in &self.counts {
            map.serialize_entry(category.label(), count)?;
        }
        map.end()
    }
}

// ── Firewall records ──────────────────────────────────────────────────────────

/// Counting bucket for a firewall action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    Allow,
    Deny,
    Other,
}

impl Category for ActionCategory {
    const ALL: &'static [Self] = &[Self::Allow, Self::Deny, Self::Other];

    fn label(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
            Self::Other => "OTHER",
        }
    }
}

/// The action column of a firewall log line, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Allow,
    Deny,
    /// Any other token, kept verbatim (upper-cased).
    Other(String),
}

impl Action {
    /// Case-insensitive parse; never fails.
    pub fn parse(token: &str) -> Self {
        let upper = token.to_uppercase();
        match upper.as_str() {
            "ALLOW" => Self::Allow,
            "DENY" => Self::Deny,
            _ => Self::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
            Self::Other(token) => token,
        }
    }

    pub fn category(&self) -> ActionCategory {
        match self {
            Self::Allow => ActionCategory::Allow,
            Self::Deny => ActionCategory::Deny,
            Self::Other(_) => ActionCategory::Other,
        }
    }
}

/// One well-formed firewall log line:
/// `date time ACTION source_ip dest_ip port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub date: String,
    pub time: String,
    pub action: Action,
    pub source_ip: String,
    pub dest_ip: String,
    pub port: u16,
}

impl LogRecord {
    /// `"<date> <time>"`, the marker used for the time range.
    pub fn timestamp(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

// ── Threat records ────────────────────────────────────────────────────────────

/// Threat severity. Unrecognised labels fold into [`Severity::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    /// Case-insensitive, exact label lookup. Surrounding whitespace makes
    /// the label unrecognised.
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "CRITICAL" => Self::Critical,
            "HIGH" => Self::High,
            "MEDIUM" => Self::Medium,
            "LOW" => Self::Low,
            _ => Self::Unknown,
        }
    }
}

impl Category for Severity {
    const ALL: &'static [Self] = &[
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Unknown,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Shape of a threat's `indicators` field.
///
/// Every JSON value maps to exactly one variant; shapes that carry no usable
/// indicator land in [`Indicators::Unrecognized`] and extract to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Indicators {
    /// Missing or `null`.
    #[default]
    Absent,
    /// A bare string.
    Single(String),
    /// A list of strings and/or `{"value": ...}` objects.
    List(Vec<IndicatorItem>),
    /// An object whose `ips` field holds one of the other shapes.
    Wrapped(Box<Indicators>),
    Unrecognized,
}

/// One element of an indicator list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorItem {
    Plain(String),
    /// An object's `value` field, already rendered as text.
    Tagged(String),
    Unrecognized,
}

impl Indicators {
    /// Flatten to indicator strings in document order.
    pub fn extract(&self) -> Vec<String> {
        match self {
            Self::Absent | Self::Unrecognized => Vec::new(),
            Self::Single(value) => vec![value.clone()],
            Self::List(items) => items.iter().filter_map(IndicatorItem::extract).collect(),
            Self::Wrapped(inner) => inner.extract(),
        }
    }
}

impl IndicatorItem {
    pub fn extract(&self) -> Option<String> {
        match self {
            Self::Plain(value) | Self::Tagged(value) => Some(value.clone()),
            Self::Unrecognized => None,
        }
    }
}

/// A threat entry after normalisation; every field has a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatRecord {
    pub id: String,
    pub threat_type: String,
    pub description: String,
    pub severity: Severity,
    pub indicators: Indicators,
    pub active_exploit: bool,
}

impl ThreatRecord {
    pub const DEFAULT_ID: &'static str = "N/A";
    pub const DEFAULT_TYPE: &'static str = "N/A";
    pub const DEFAULT_DESCRIPTION: &'static str = "No description provided";
}

impl Default for ThreatRecord {
    fn default() -> Self {
        Self {
            id: Self::DEFAULT_ID.to_string(),
            threat_type: Self::DEFAULT_TYPE.to_string(),
            description: Self::DEFAULT_DESCRIPTION.to_string(),
            severity: Severity::Unknown,
            indicators: Indicators::Absent,
            active_exploit: false,
        }
    }
}

// ── File inventory ────────────────────────────────────────────────────────────

/// Bucket a file falls into by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Documents,
    Images,
    Archives,
    Executables,
    Videos,
    Audio,
    Other,
}

impl Category for FileCategory {
    const ALL: &'static [Self] = &[
        Self::Documents,
        Self::Images,
        Self::Archives,
        Self::Executables,
        Self::Videos,
        Self::Audio,
        Self::Other,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Images => "images",
            Self::Archives => "archives",
            Self::Executables => "executables",
            Self::Videos => "videos",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
