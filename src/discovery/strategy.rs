// src/discovery/strategy.rs

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::budget::Budget;
use crate::discovery::package::{PackageBuilder, PackageDescriptor};
use crate::fs::{FileSystem, RealFileSystem};

/// One way of turning a descriptor into a buildable package.
///
/// Returning `None` is not an error: it means "not mine, try the next
/// strategy".
pub trait PackageDiscoveryStrategy: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn locate(&self, descriptor: &PackageDescriptor, budget: &Budget) -> Option<PackageBuilder>;
}

/// Extensions recognized when none are configured.
pub fn default_project_extensions() -> Vec<String> {
    vec!["csproj".to_string()]
}

fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Exact, case-sensitive comparison against the file's final extension.
fn has_project_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext))
}

/// Resolves descriptors that name an existing project file.
///
/// The builder is rooted at the file's parent directory (`.` for a bare
/// file name) and named after the descriptor.
#[derive(Debug, Clone)]
pub struct ProjectFileStrategy {
    rebuildable: bool,
    extensions: Vec<String>,
    fs: Arc<dyn FileSystem>,
}

impl ProjectFileStrategy {
    pub fn new(rebuildable: bool) -> Self {
        Self {
            rebuildable,
            extensions: default_project_extensions(),
            fs: Arc::new(RealFileSystem),
        }
    }

    /// Replace the recognized extensions (leading dots are ignored).
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = normalize_extensions(extensions);
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }
}

impl PackageDiscoveryStrategy for ProjectFileStrategy {
    fn name(&self) -> &'static str {
        "project-file"
    }

    fn locate(&self, descriptor: &PackageDescriptor, _budget: &Budget) -> Option<PackageBuilder> {
        let project_file = Path::new(&descriptor.name);

        if !has_project_extension(project_file, &self.extensions) {
            trace!(name = %descriptor.name, "not a recognized project file");
            return None;
        }
        if !self.fs.is_file(project_file) {
            trace!(name = %descriptor.name, "project file does not exist");
            return None;
        }

        let directory = match project_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };

        debug!(
            name = %descriptor.name,
            directory = %directory.display(),
            rebuildable = self.rebuildable,
            "located package from project file"
        );
        Some(PackageBuilder::new(&descriptor.name, directory).with_rebuildable(self.rebuildable))
    }
}

/// Resolves descriptors that name a directory holding exactly one project
/// file. The builder is rooted at that directory and named after the file.
#[derive(Debug, Clone)]
pub struct ProjectDirectoryStrategy {
    rebuildable: bool,
    extensions: Vec<String>,
    fs: Arc<dyn FileSystem>,
}

impl ProjectDirectoryStrategy {
    pub fn new(rebuildable: bool) -> Self {
        Self {
            rebuildable,
            extensions: default_project_extensions(),
            fs: Arc::new(RealFileSystem),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = normalize_extensions(extensions);
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }
}

impl PackageDiscoveryStrategy for ProjectDirectoryStrategy {
    fn name(&self) -> &'static str {
        "project-directory"
    }

    fn locate(&self, descriptor: &PackageDescriptor, _budget: &Budget) -> Option<PackageBuilder> {
        let dir = Path::new(&descriptor.name);
        if !self.fs.is_dir(dir) {
            return None;
        }

        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(name = %descriptor.name, error = %e, "cannot list candidate directory");
                return None;
            }
        };

        let mut projects = entries
            .into_iter()
            .filter(|p| has_project_extension(p, &self.extensions) && self.fs.is_file(p));

        let project = projects.next()?;
        if projects.next().is_some() {
            debug!(name = %descriptor.name, "directory holds several project files; ambiguous");
            return None;
        }

        let name = project.to_string_lossy().into_owned();
        debug!(
            name = %name,
            directory = %dir.display(),
            rebuildable = self.rebuildable,
            "located package from project directory"
        );
        Some(PackageBuilder::new(name, dir).with_rebuildable(self.rebuildable))
    }
}
