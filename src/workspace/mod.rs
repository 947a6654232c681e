//! Workspace packages and the registry that holds them
//!
//! The registry is rebuilt from manifests on every run and passed around
//! explicitly. Nothing here is cached between invocations.

pub mod discovery;

pub use discovery::discover;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A workspace package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
  /// Canonical name (PEP 503 normalized)
  pub name: String,
  /// Directory relative to the workspace root
  pub path: PathBuf,
  /// Current version from the manifest
  pub version: String,
  /// Internal dependencies, first-seen order, no duplicates
  pub deps: Vec<String>,
}

/// All packages of one discovery pass, keyed by canonical name
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
  packages: BTreeMap<String, Package>,
}

impl PackageRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a package, returning the previous one with the same name
  pub fn insert(&mut self, package: Package) -> Option<Package> {
    self.packages.insert(package.name.clone(), package)
  }

  pub fn get(&self, name: &str) -> Option<&Package> {
    self.packages.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.packages.contains_key(name)
  }

  /// Packages sorted by name
  pub fn iter(&self) -> impl Iterator<Item = &Package> {
    self.packages.values()
  }

  /// Package names sorted
  pub fn names(&self) -> Vec<String> {
    self.packages.keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.packages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.packages.is_empty()
  }
}

impl FromIterator<Package> for PackageRegistry {
  fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
    let mut registry = Self::new();
    for package in iter {
      registry.insert(package);
    }
    registry
  }
}
