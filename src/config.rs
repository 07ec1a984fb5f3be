//! Configuration file parsing for generation runs

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::MutationError;
use crate::mutator::OpId;

/// Top-level configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: String,
    /// Root directory that receives mutant directories and the audit files
    #[serde(default = "default_mutant_root")]
    pub mutant_root: PathBuf,
    /// Operator names to run; all of them when omitted
    #[serde(default = "all_operator_names")]
    pub operators: Vec<String>,
    /// Source files to mutate
    pub sources: Vec<PathBuf>,
    /// Optional command used to compile each emitted mutant
    #[serde(default)]
    pub compile: Option<String>,
}

fn default_mutant_root() -> PathBuf {
    PathBuf::from("mutants")
}

fn all_operator_names() -> Vec<String> {
    OpId::ALL.iter().map(|op| op.name().to_string()).collect()
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, MutationError> {
        let content = std::fs::read_to_string(path).map_err(|e| MutationError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| MutationError::Config {
                message: format!("Failed to parse config file '{}': {}", path.display(), e),
            })?;

        Ok(config)
    }

    /// Resolve the configured operator names.
    pub fn operator_ids(&self) -> Result<Vec<OpId>, MutationError> {
        let mut ops = Vec::new();
        for name in &self.operators {
            let op = OpId::parse(name).ok_or_else(|| MutationError::UnknownOperator {
                name: name.clone(),
                available: all_operator_names().join(", "),
            })?;
            if !ops.contains(&op) {
                ops.push(op);
            }
        }
        Ok(ops)
    }

    /// Validate the configuration against the filesystem
    pub fn validate(&self) -> Result<(), Vec<MutationError>> {
        let mut errors = Vec::new();

        if self.sources.is_empty() {
            errors.push(MutationError::Config {
                message: "no source files configured".to_string(),
            });
        }
        for source in &self.sources {
            if !source.exists() {
                errors.push(MutationError::Config {
                    message: format!("source file '{}' not found", source.display()),
                });
            }
        }
        if let Err(e) = self.operator_ids() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
