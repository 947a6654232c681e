//! Unified workspace context - build once, pass everywhere
//!
//! # Design
//!
//! WorkspaceContext holds everything discovery produces: config, the package
//! registry, the dependency graph and its build order. It is built once in
//! main.rs from the manifests on disk and passed by reference to commands.
//! Nothing survives the process; the next run rediscovers from scratch.
//!
//! ```text
//! main.rs:
//!   WorkspaceContext::build() -> &WorkspaceContext
//!   |
//!   v
//! commands/release.rs, plan.rs, steps.rs:
//!   fn run_*(ctx: &WorkspaceContext, ...)
//! ```

use crate::core::config::RailConfig;
use crate::core::error::RailResult;
use crate::graph::workspace_graph::WorkspaceGraph;
use crate::workspace::{self, Package, PackageRegistry};
use std::path::{Path, PathBuf};

/// Everything discovered about one workspace for one run.
pub struct WorkspaceContext {
  /// Workspace root directory (holds the root pyproject.toml)
  pub root: PathBuf,

  /// wheel-rail.toml, or defaults
  pub config: RailConfig,

  /// Packages by canonical name
  pub registry: PackageRegistry,

  /// Internal dependency graph
  pub graph: WorkspaceGraph,

  /// Build order of the whole workspace (dependencies first)
  pub order: Vec<String>,
}

impl WorkspaceContext {
  /// Discover the workspace rooted at `workspace_root`.
  ///
  /// Fails on a missing root manifest, empty member list, no matching packages,
  /// or a dependency cycle.
  pub fn build(workspace_root: &Path) -> RailResult<Self> {
    let config = RailConfig::load(workspace_root)?;
    Self::with_config(workspace_root, config)
  }

  /// Discover with an explicit config
  pub fn with_config(workspace_root: &Path, config: RailConfig) -> RailResult<Self> {
    let root = workspace_root.to_path_buf();
    let registry = workspace::discover(&root)?;
    let graph = WorkspaceGraph::from_registry(&registry);
    let order = graph.topological_order()?;

    Ok(Self {
      root,
      config,
      registry,
      graph,
      order,
    })
  }

  /// Packages in build order
  pub fn packages_in_order(&self) -> Vec<&Package> {
    self.order.iter().filter_map(|name| self.registry.get(name)).collect()
  }

  /// Dist directory, resolved against the workspace root
  pub fn dist_dir(&self) -> PathBuf {
    self.root.join(&self.config.dist_dir)
  }

  /// Staging directory for downloaded wheels
  pub fn staging_dir(&self) -> PathBuf {
    self.root.join(&self.config.staging_dir)
  }

  /// Manifest path of a package
  pub fn manifest_path(&self, package: &Package) -> PathBuf {
    self.root.join(&package.path).join("pyproject.toml")
  }
}
