//! Utility functions for cross-platform path handling

use std::path::Path;

/// Convert a path to Git format (always forward slashes)
///
/// Git reports paths with forward slashes, even on Windows. Package prefixes are
/// compared against `git diff` output, so both sides go through this.
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Directory prefix used to match changed paths, always ending in `/`
pub fn git_dir_prefix(path: &Path) -> String {
  let mut prefix = path_to_git_format(path).trim_end_matches('/').to_string();
  prefix.push('/');
  prefix
}
