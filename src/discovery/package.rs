// src/discovery/package.rs

use std::path::{Path, PathBuf};

/// Name or identifier of a package to look up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageDescriptor {
    pub name: String,
}

impl PackageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&str> for PackageDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A located, buildable package.
///
/// Owned by whoever receives it from a strategy; nothing else holds a
/// reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageBuilder {
    pub name: String,
    pub directory: PathBuf,
    /// Whether the package must support incremental rebuilds.
    pub rebuildable: bool,
}

impl PackageBuilder {
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            rebuildable: false,
        }
    }

    pub fn with_rebuildable(mut self, rebuildable: bool) -> Self {
        self.rebuildable = rebuildable;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}
