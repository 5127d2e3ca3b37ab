// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimeboxError {
    /// The budget was already spent when `label` tried to charge it.
    #[error("Budget exceeded: {label} (after {entries} entries)")]
    BudgetExceeded { label: String, entries: usize },

    /// The OS refused or failed to create the child process.
    #[error("Failed to start process '{command}': {source}")]
    ProcessStart {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimeboxError {
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, TimeboxError::BudgetExceeded { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TimeboxError>;
