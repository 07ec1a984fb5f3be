//! Error types for mutant generation

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating mutants
#[derive(Debug, Error)]
pub enum MutationError {
    /// Source file couldn't be parsed; fatal for that unit only
    #[error("failed to parse '{file}' at line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// Failed to read a source file
    #[error("failed to read '{}': {error}", file.display())]
    FileRead { file: PathBuf, error: std::io::Error },

    /// Failed to write a mutant to its destination path
    #[error("failed to write mutant '{}': {error}", path.display())]
    Emission { path: PathBuf, error: std::io::Error },

    /// An operator name in the configuration is not part of the catalog
    #[error("unknown mutation operator '{name}'\n  available operators: {available}")]
    UnknownOperator { name: String, available: String },

    /// Configuration error
    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Result type for mutant generation
pub type Result<T> = std::result::Result<T, MutationError>;
