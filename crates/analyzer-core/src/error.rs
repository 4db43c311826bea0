use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the analyzer pipelines and calculators.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The source artifact does not exist.
    #[error("Source not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The source artifact exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be parsed (invalid JSON, non-numeric port, ...).
    #[error("Malformed input in {}: {detail}", path.display())]
    MalformedInput { path: PathBuf, detail: String },

    /// A report sink could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An analysis result could not be serialised.
    #[error("Failed to serialise report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A calculator received an argument outside its domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Build a [`AnalyzerError::MalformedInput`] for a specific line.
    pub fn malformed_line(
        path: impl Into<PathBuf>,
        line: usize,
        detail: impl std::fmt::Display,
    ) -> Self {
        AnalyzerError::MalformedInput {
            path: path.into(),
            detail: format!("line {line}: {detail}"),
        }
    }

    /// Map an `open`/`read` failure to `NotFound` or `Read` depending on kind.
    pub fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AnalyzerError::NotFound { path }
        } else {
            AnalyzerError::Read { path, source }
        }
    }
}

/// Convenience alias used throughout the analyzer crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = AnalyzerError::NotFound {
            path: PathBuf::from("/var/log/firewall.log"),
        };
        assert_eq!(err.to_string(), "Source not found: /var/log/firewall.log");
    }

    #[test]
    fn test_error_display_malformed_line() {
        let err = AnalyzerError::malformed_line("fw.log", 7, "invalid digit found in string");
        let msg = err.to_string();
        assert!(msg.contains("fw.log"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("invalid digit"));
    }

    #[test]
    fn test_error_display_write_failure() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AnalyzerError::WriteFailure {
            path: PathBuf::from("/readonly/report.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to write"));
        assert!(msg.contains("/readonly/report.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_from_read_maps_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AnalyzerError::from_read("threats.json", io_err);
        assert!(matches!(err, AnalyzerError::NotFound { .. }));
    }

    #[test]
    fn test_from_read_keeps_other_kinds() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AnalyzerError::from_read("threats.json", io_err);
        assert!(matches!(err, AnalyzerError::Read { .. }));
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = AnalyzerError::InvalidInput("prefix must be between 0 and 32".to_string());
        assert_eq!(err.to_string(), "Invalid input: prefix must be between 0 and 32");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: AnalyzerError = json_err.into();
        assert!(err.to_string().contains("Failed to serialise report"));
    }
}
