//! Domain types, error taxonomy, configuration and stateless calculators
//! shared by the analyzer pipelines and the `secops-analyzer` binary.

pub mod calculators;
pub mod error;
pub mod formatting;
pub mod lookup;
pub mod models;
pub mod password;
pub mod settings;

pub use error::{AnalyzerError, Result};
