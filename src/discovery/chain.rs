// src/discovery/chain.rs

use std::sync::Arc;

use tracing::debug;

use crate::budget::Budget;
use crate::config::DiscoverySection;
use crate::discovery::package::{PackageBuilder, PackageDescriptor};
use crate::discovery::strategy::{
    PackageDiscoveryStrategy, ProjectDirectoryStrategy, ProjectFileStrategy,
};
use crate::errors::{Result, TimeboxError};
use crate::fs::{FileSystem, RealFileSystem};

/// Strategies evaluated in a fixed priority order.
#[derive(Default)]
pub struct DiscoveryChain {
    strategies: Vec<Box<dyn PackageDiscoveryStrategy>>,
}

impl DiscoveryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy with lower priority than those already present.
    pub fn with_strategy(mut self, strategy: impl PackageDiscoveryStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// The standard chain: project file first, then project directory.
    pub fn from_config(section: &DiscoverySection) -> Self {
        Self::from_config_with_fs(section, Arc::new(RealFileSystem))
    }

    pub fn from_config_with_fs(section: &DiscoverySection, fs: Arc<dyn FileSystem>) -> Self {
        Self::new()
            .with_strategy(
                ProjectFileStrategy::new(section.rebuildable)
                    .with_extensions(section.extensions.clone())
                    .with_fs(Arc::clone(&fs)),
            )
            .with_strategy(
                ProjectDirectoryStrategy::new(section.rebuildable)
                    .with_extensions(section.extensions.clone())
                    .with_fs(fs),
            )
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Return the first strategy's builder, or `None` if every strategy
    /// deferred.
    ///
    /// Fails with `BudgetExceeded` without consulting any strategy if the
    /// budget is already spent.
    pub fn locate(
        &self,
        descriptor: &PackageDescriptor,
        budget: &Budget,
    ) -> Result<Option<PackageBuilder>> {
        if budget.is_exceeded() {
            return Err(TimeboxError::BudgetExceeded {
                label: format!("Locate ({})", descriptor.name),
                entries: budget.entries().len(),
            });
        }

        for strategy in self.strategies.iter() {
            if let Some(builder) = strategy.locate(descriptor, budget) {
                debug!(
                    name = %descriptor.name,
                    strategy = strategy.name(),
                    "package located"
                );
                return Ok(Some(builder));
            }
        }

        debug!(name = %descriptor.name, "no strategy located the package");
        Ok(None)
    }
}
