//! Version control interface
//!
//! The release pipeline only sees the `Vcs` trait. `SystemGit` is the real
//! backend; tests use in-memory fakes.

pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::RailResult;
use std::path::PathBuf;

/// Operations the release pipeline needs from version control
pub trait Vcs {
  /// Tags matching a glob pattern, highest version first
  fn list_tags(&self, pattern: &str) -> RailResult<Vec<String>>;

  /// Paths (repo-relative, forward slashes) changed between two revisions
  fn diff_paths(&self, from: &str, to: &str) -> RailResult<Vec<String>>;

  /// Create a lightweight tag at HEAD
  fn create_tag(&self, name: &str) -> RailResult<()>;

  /// Stage files (repo-relative or absolute)
  fn stage(&self, paths: &[PathBuf]) -> RailResult<()>;

  /// Paths currently staged for commit
  fn staged_paths(&self) -> RailResult<Vec<String>>;

  /// Commit the index with a subject line and a body paragraph
  fn commit(&self, subject: &str, body: &str) -> RailResult<()>;

  /// Push the current branch and all tags
  fn push(&self) -> RailResult<()>;
}
