//! Release host interface
//!
//! Where published wheels live. `GhCli` talks to GitHub Releases through the
//! `gh` binary; tests use in-memory fakes.

pub mod github;

pub use github::GhCli;

use crate::core::error::RailResult;
use std::path::{Path, PathBuf};

/// One published release and the names of its attached files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
  pub tag: String,
  pub assets: Vec<String>,
}

/// Operations the release pipeline needs from the release host
pub trait ReleaseHost {
  /// Up to `limit` releases, most recent first
  fn list_releases(&self, limit: usize) -> RailResult<Vec<PublishedRelease>>;

  /// Download the assets of `tag` matching `pattern` into `dest`, overwriting
  fn download_artifacts(&self, tag: &str, pattern: &str, dest: &Path) -> RailResult<()>;

  /// Create release `tag` with `files` attached
  fn create_release(&self, tag: &str, files: &[PathBuf], title: &str, notes: &str) -> RailResult<()>;
}
