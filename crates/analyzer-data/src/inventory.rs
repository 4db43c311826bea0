//! Read-only directory inventory: list the files directly inside a
//! directory and count them by extension category.

use std::path::Path;

use analyzer_core::error::{AnalyzerError, Result};
use analyzer_core::formatting::ratio_percent;
use analyzer_core::lookup::CategoryTable;
use analyzer_core::models::{Category, CategoryCounts, FileCategory};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// Summary of one directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryAnalysis {
    pub source_directory: String,
    pub total_files: usize,
    pub statistics: CategoryCounts<FileCategory>,
    #[serde(serialize_with = "serialize_percentages")]
    pub percentages: Vec<(FileCategory, f64)>,
    /// Entries that could not be inspected, sorted.
    pub errors: Vec<String>,
}

fn serialize_percentages<S: Serializer>(
    shares: &[(FileCategory, f64)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(shares.len()))?;
    for (category, share) in shares {
        map.serialize_entry(category.label(), share)?;
    }
    map.end()
}

/// File names (not paths) directly under `dir`, plus per-entry errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub file_names: Vec<String>,
    pub errors: Vec<String>,
}

/// List regular files in `dir` without descending into subdirectories.
pub fn list_files(dir: &Path) -> Result<DirectoryListing> {
    let metadata = std::fs::metadata(dir).map_err(|e| AnalyzerError::from_read(dir, e))?;
    if !metadata.is_dir() {
        return Err(AnalyzerError::InvalidInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut listing = DirectoryListing::default();
    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                listing
                    .file_names
                    .push(entry.file_name().to_string_lossy().into_owned());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                listing.errors.push(e.to_string());
            }
        }
    }

    debug!(
        "Directory {}: {} files, {} errors",
        dir.display(),
        listing.file_names.len(),
        listing.errors.len()
    );

    Ok(listing)
}

/// Count `listing` into categories using `table`.
pub fn aggregate_inventory(
    source_directory: &Path,
    listing: DirectoryListing,
    table: &CategoryTable,
) -> InventoryAnalysis {
    let mut statistics: CategoryCounts<FileCategory> = CategoryCounts::new();
    for name in &listing.file_names {
        statistics.increment(table.classify_name(name));
    }

    let total_files = listing.file_names.len();
    let percentages = statistics
        .iter()
        .map(|(category, count)| (category, ratio_percent(count, total_files)))
        .collect();

    let mut errors = listing.errors;
    errors.sort();

    InventoryAnalysis {
        source_directory: source_directory.display().to_string(),
        total_files,
        statistics,
        percentages,
        errors,
    }
}
