//! Release plan: the changed/unchanged partition of one run
//!
//! A plan is the output of FindMarkers + DetectChanges. It is what `plan`
//! prints, what the CI `discover` step exports, and what the release pipeline
//! executes.

use super::markers::{LastTags, find_last_tags};
use crate::core::context::WorkspaceContext;
use crate::core::error::RailResult;
use crate::core::vcs::Vcs;
use crate::graph::affected::{ChangeReason, ChangeSet, detect_changes};
use crate::workspace::Package;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Plan identifier (SHA256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// Changed and unchanged packages, each in build order
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePlan {
  pub changed: Vec<Package>,
  pub unchanged: Vec<Package>,
  pub reasons: BTreeMap<String, ChangeReason>,
  pub last_tags: LastTags,
  pub force_all: bool,
}

/// JSON form of a plan
#[derive(Serialize)]
struct PlanReport<'a> {
  plan_id: PlanId,
  generated_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  release_tag: Option<&'a str>,
  #[serde(flatten)]
  plan: &'a ReleasePlan,
}

impl ReleasePlan {
  /// Find markers and detect changes for the whole workspace
  pub fn analyze(ctx: &WorkspaceContext, vcs: &dyn Vcs, force_all: bool) -> RailResult<Self> {
    let last_tags = find_last_tags(&ctx.registry, vcs)?;
    let changes = detect_changes(
      &ctx.registry,
      &ctx.graph,
      &last_tags,
      vcs,
      &ctx.config.root_config_files,
      force_all,
    )?;
    Self::from_changes(ctx, changes, last_tags, force_all)
  }

  /// Partition the workspace by a computed change set.
  ///
  /// Each side is ordered by sorting just that subset, so dependencies come
  /// before dependents within it.
  pub fn from_changes(ctx: &WorkspaceContext, changes: ChangeSet, last_tags: LastTags, force_all: bool) -> RailResult<Self> {
    let (changed_names, unchanged_names): (Vec<String>, Vec<String>) =
      ctx.order.iter().cloned().partition(|name| changes.contains(name));

    let changed = Self::ordered(ctx, &changed_names)?;
    let unchanged = Self::ordered(ctx, &unchanged_names)?;

    Ok(Self {
      changed,
      unchanged,
      reasons: changes.reasons,
      last_tags,
      force_all,
    })
  }

  fn ordered(ctx: &WorkspaceContext, names: &[String]) -> RailResult<Vec<Package>> {
    Ok(
      ctx
        .graph
        .subset(names)
        .topological_order()?
        .iter()
        .filter_map(|name| ctx.registry.get(name).cloned())
        .collect(),
    )
  }

  /// Nothing to release
  pub fn is_empty(&self) -> bool {
    self.changed.is_empty()
  }

  pub fn changed_names(&self) -> Vec<String> {
    self.changed.iter().map(|p| p.name.clone()).collect()
  }

  pub fn unchanged_names(&self) -> Vec<String> {
    self.unchanged.iter().map(|p| p.name.clone()).collect()
  }

  /// Content hash; identical inputs give identical ids
  pub fn id(&self) -> RailResult<PlanId> {
    Ok(PlanId::from_contents(&serde_json::to_vec(self)?))
  }

  /// Pretty JSON with id and timestamp
  pub fn to_json(&self, release_tag: Option<&str>) -> RailResult<String> {
    let report = PlanReport {
      plan_id: self.id()?,
      generated_at: Utc::now(),
      release_tag,
      plan: self,
    };
    Ok(serde_json::to_string_pretty(&report)?)
  }

  /// Human-readable summary
  pub fn to_human_readable(&self) -> String {
    let mut out = String::new();

    out.push_str(&format!("Changed ({}):\n", self.changed.len()));
    if self.changed.is_empty() {
      out.push_str("  (none)\n");
    }
    for pkg in &self.changed {
      let reason = self.reasons.get(&pkg.name).map(|r| r.to_string()).unwrap_or_default();
      out.push_str(&format!("  {} {}  ({})\n", pkg.name, pkg.version, reason));
    }

    out.push_str(&format!("Unchanged ({}):\n", self.unchanged.len()));
    if self.unchanged.is_empty() {
      out.push_str("  (none)\n");
    }
    for pkg in &self.unchanged {
      let tag = self
        .last_tags
        .get(&pkg.name)
        .and_then(|t| t.as_deref())
        .unwrap_or("<none>");
      out.push_str(&format!("  {} {}  (last tag {})\n", pkg.name, pkg.version, tag));
    }

    out
  }
}
