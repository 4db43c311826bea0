//! Static lookup tables handed to the pipelines that need them.

use std::collections::HashMap;

use crate::models::FileCategory;

// ── PortNames ─────────────────────────────────────────────────────────────────

/// Well-known service names for ports that show up in firewall reports.
#[derive(Debug, Clone)]
pub struct PortNames {
    names: HashMap<u16, &'static str>,
}

impl PortNames {
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn new(entries: &[(u16, &'static str)]) -> Self {
        Self {
            names: entries.iter().copied().collect(),
        }
    }

    /// Service name for `port`, or `"Unknown"`.
    pub fn service_name(&self, port: u16) -> &'static str {
        self.names.get(&port).copied().unwrap_or(Self::UNKNOWN)
    }
}

impl Default for PortNames {
    fn default() -> Self {
        Self::new(&[
            (22, "SSH"),
            (23, "Telnet"),
            (80, "HTTP"),
            (135, "RPC"),
            (443, "HTTPS"),
            (445, "SMB"),
            (3306, "MySQL"),
            (3389, "RDP"),
        ])
    }
}

// ── CategoryTable ─────────────────────────────────────────────────────────────

/// Extension → [`FileCategory`] mapping. Extensions are lower case, no dot.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<(FileCategory, &'static [&'static str])>,
}

impl CategoryTable {
    pub fn new(rules: Vec<(FileCategory, &'static [&'static str])>) -> Self {
        Self { rules }
    }

    /// First matching category wins; unmatched extensions are `Other`.
    pub fn classify(&self, extension: &str) -> FileCategory {
        self.rules
            .iter()
            .find(|(_, exts)| exts.contains(&extension))
            .map(|(category, _)| *category)
            .unwrap_or(FileCategory::Other)
    }

    /// Classify a file name by its last extension, case-insensitively.
    pub fn classify_name(&self, file_name: &str) -> FileCategory {
        self.classify(&extension_of(file_name))
    }
}

/// Extension groups used when no custom table is configured.
const DEFAULT_CATEGORY_RULES: &[(FileCategory, &[&str])] = &[
    (
        FileCategory::Documents,
        &["pdf", "doc", "docx", "txt", "xlsx", "pptx"],
    ),
    (FileCategory::Images, &["jpg", "jpeg", "png", "gif", "bmp"]),
    (FileCategory::Archives, &["zip", "tar", "gz", "rar"]),
    (FileCategory::Executables, &["exe", "msi", "dmg"]),
    (FileCategory::Videos, &["mp4", "mov", "avi", "mkv"]),
    (FileCategory::Audio, &["mp3", "wav", "aac"]),
];

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_RULES.to_vec())
    }
}

/// Text after the last `.`, lower-cased; empty when there is no dot.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}
