//! Artifact builder
//!
//! Runs the configured build command once per package. Output is inherited so
//! the build log streams straight to the terminal.

use crate::core::error::{RailResult, ResultExt};
use crate::utils::path_to_git_format;
use crate::workspace::Package;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Builds one package into an output directory
pub trait Builder {
  /// Returns `false` when the build ran and failed
  fn build(&self, package: &Package, out_dir: &Path) -> RailResult<bool>;
}

/// Runs an external command; `{path}`, `{out_dir}` and `{name}` are substituted
pub struct CommandBuilder {
  command: Vec<String>,
  root: PathBuf,
}

impl CommandBuilder {
  pub fn new(command: &[String], root: &Path) -> Self {
    Self {
      command: command.to_vec(),
      root: root.to_path_buf(),
    }
  }

  /// The argv for one package, placeholders filled in
  pub fn argv(&self, package: &Package, out_dir: &Path) -> Vec<String> {
    let path = path_to_git_format(&package.path);
    let out_dir = out_dir.to_string_lossy();
    self
      .command
      .iter()
      .map(|arg| {
        arg
          .replace("{path}", &path)
          .replace("{out_dir}", &out_dir)
          .replace("{name}", &package.name)
      })
      .collect()
  }
}

impl Builder for CommandBuilder {
  fn build(&self, package: &Package, out_dir: &Path) -> RailResult<bool> {
    let argv = self.argv(package, out_dir);
    let Some((program, rest)) = argv.split_first() else {
      return Ok(false);
    };

    tracing::debug!("running {}", argv.join(" "));
    let status = Command::new(program)
      .args(rest)
      .current_dir(&self.root)
      .status()
      .with_context(|| format!("Failed to run build command '{}'", program))?;

    Ok(status.success())
  }
}
