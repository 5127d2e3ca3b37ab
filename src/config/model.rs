// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::budget::Budget;

/// Configuration exactly as read from a TOML file.
///
/// ```toml
/// [budget]
/// timeout = "30s"
/// max_entries = 16
///
/// [env]
/// DOTNET_CLI_TELEMETRY_OPTOUT = "1"
///
/// [discovery]
/// rebuildable = false
/// extensions = ["csproj"]
/// ```
///
/// All sections are optional. Turn it into a [`ConfigFile`] with
/// `ConfigFile::try_from`, which validates and parses durations.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub budget: RawBudgetSection,

    /// Environment variable overrides applied to every executed process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub discovery: DiscoverySection,
}

/// `[budget]` section before validation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawBudgetSection {
    /// Duration string such as `"30s"`; no deadline when absent.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Maximum number of bounded operations charged against one budget.
    #[serde(default)]
    pub max_entries: Option<usize>,
}

/// `[discovery]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySection {
    /// Copied into every located `PackageBuilder`.
    #[serde(default)]
    pub rebuildable: bool,

    /// Recognized project-file extensions, with or without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["csproj".to_string()]
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            rebuildable: false,
            extensions: default_extensions(),
        }
    }
}

/// Validated `[budget]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetSection {
    pub timeout: Option<Duration>,
    pub max_entries: Option<usize>,
}

impl BudgetSection {
    /// Create a fresh budget for one top-level request.
    pub fn to_budget(&self) -> Budget {
        Budget::new(self.timeout, self.max_entries)
    }
}

/// Validated configuration used by the rest of the crate.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub budget: BudgetSection,
    pub env: BTreeMap<String, String>,
    pub discovery: DiscoverySection,
}

impl ConfigFile {
    /// Build without validation; callers go through `TryFrom<RawConfigFile>`.
    pub(crate) fn new_unchecked(
        budget: BudgetSection,
        env: BTreeMap<String, String>,
        discovery: DiscoverySection,
    ) -> Self {
        Self {
            budget,
            env,
            discovery,
        }
    }

    /// Environment overrides as ordered key/value pairs.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
