use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AnalyzerError;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Firewall log and threat-intelligence analysis with JSON and text reports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "secops-analyzer",
    about = "Firewall log and threat-intelligence analysis with JSON and text reports",
    version
)]
pub struct Settings {
    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (in addition to stderr)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Directory that relative report paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Clear saved configuration
    #[arg(long, global = true)]
    pub clear: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Report destinations shared by the pipeline subcommands.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct ReportTargets {
    /// Structured (JSON) report path, or "-" for stdout
    #[arg(long)]
    pub json: Option<String>,

    /// Text report path, or "-" for stdout
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Analyse a whitespace-delimited firewall log
    Firewall {
        /// Log file: `date time ACTION source_ip dest_ip port` per line
        log: PathBuf,
        #[command(flatten)]
        targets: ReportTargets,
    },
    /// Analyse a JSON threat-intelligence feed
    Threats {
        /// JSON feed with `feed_name`, `date` and `threats`
        feed: PathBuf,
        #[command(flatten)]
        targets: ReportTargets,
    },
    /// Count the files in a directory by category (read-only)
    Inventory {
        dir: PathBuf,
        #[command(flatten)]
        targets: ReportTargets,
    },
    /// Validate IPv4 addresses
    IpCheck {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Subnet size and network class
    Subnet {
        network_ip: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=32))]
        prefix: u8,
    },
    /// Convert hexadecimal values to decimal and back
    Hex {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Rate a CVSS base score
    Cvss {
        score: f64,
        #[arg(long, default_value = "N/A")]
        id: String,
        #[arg(long, default_value = "No description provided")]
        description: String,
    },
    /// Score password strength
    Password {
        #[arg(required = true)]
        passwords: Vec<String>,
    },
}

impl Command {
    /// Default `(json, text)` destinations for the pipeline subcommands.
    pub fn default_targets(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Command::Firewall { .. } => Some(("log_analysis.json", "-")),
            Command::Threats { .. } => Some(("threat_analysis.json", "threat_report.txt")),
            Command::Inventory { .. } => Some(("inventory_report.json", "inventory_report.txt")),
            _ => None,
        }
    }
}

// ── ReportSink ─────────────────────────────────────────────────────────────────

/// Where one report rendering is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSink {
    Stdout,
    File(PathBuf),
}

impl ReportSink {
    /// `"-"` is stdout; relative paths are joined onto `output_dir`.
    pub fn resolve(target: &str, output_dir: &Path) -> Self {
        if target == "-" {
            return ReportSink::Stdout;
        }
        let path = Path::new(target);
        if path.is_absolute() {
            ReportSink::File(path.to_path_buf())
        } else {
            ReportSink::File(output_dir.join(path))
        }
    }
}

impl std::fmt::Display for ReportSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSink::Stdout => write!(f, "<stdout>"),
            ReportSink::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl ReportTargets {
    /// Resolve both destinations, falling back to `defaults`.
    pub fn resolve(&self, defaults: (&str, &str), output_dir: &Path) -> (ReportSink, ReportSink) {
        let json = self.json.as_deref().unwrap_or(defaults.0);
        let text = self.text.as_deref().unwrap_or(defaults.1);
        (
            ReportSink::resolve(json, output_dir),
            ReportSink::resolve(text, output_dir),
        )
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.secops-analyzer/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl LastUsedParams {
    /// `~/.secops-analyzer/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".secops-analyzer").join("last_used.json")
    }

    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Result<Self, clap::Error> {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Result<Self, clap::Error> {
        let matches = Settings::command().try_get_matches_from(args)?;
        let mut settings = Settings::from_arg_matches(&matches)?;

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Could not clear {}: {}", config_path.display(), e);
            }
            return Ok(Self::apply_debug(settings));
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "output_dir") {
            if let Some(v) = last.output_dir {
                settings.output_dir = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "log_level") {
            if let Some(v) = last.log_level {
                settings.log_level = v;
            }
        }

        // Persist before --debug is applied so it stays a one-off.
        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("Could not persist settings to {}: {}", config_path.display(), e);
        }

        Ok(Self::apply_debug(settings))
    }

    /// Reject an `--output-dir` that exists but is not a directory.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(AnalyzerError::Config(format!(
                "output directory {} is not a directory",
                self.output_dir.display()
            )));
        }
        Ok(())
    }

    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            output_dir: Some(s.output_dir.clone()),
            log_level: Some(s.log_level.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
