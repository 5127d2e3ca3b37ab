// src/discovery/mod.rs

//! Package discovery: map a [`PackageDescriptor`] to a [`PackageBuilder`].
//!
//! Each [`PackageDiscoveryStrategy`] either resolves a descriptor or defers;
//! a [`DiscoveryChain`] asks them in order and stops at the first hit.

pub mod chain;
pub mod package;
pub mod strategy;

pub use chain::DiscoveryChain;
pub use package::{PackageBuilder, PackageDescriptor};
pub use strategy::{PackageDiscoveryStrategy, ProjectDirectoryStrategy, ProjectFileStrategy};
