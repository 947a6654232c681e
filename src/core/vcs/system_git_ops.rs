//! `Vcs` operations for SystemGit (tags, diffs, commits, push)

use super::Vcs;
use super::system_git::{SystemGit, output_lines};
use crate::core::error::{GitError, RailError, RailResult, ResultExt};
use crate::utils::path_to_git_format;
use std::path::PathBuf;

impl Vcs for SystemGit {
  fn list_tags(&self, pattern: &str) -> RailResult<Vec<String>> {
    let output = self.run(&["tag", "--list", pattern, "--sort=-v:refname"])?;
    Ok(output_lines(&output))
  }

  // `--relative` keeps paths rooted at the workspace even when it sits below the
  // repository toplevel; changes outside the workspace are left out.
  fn diff_paths(&self, from: &str, to: &str) -> RailResult<Vec<String>> {
    let output = self.run(&["diff", "--name-only", "--relative", from, to])?;
    Ok(output_lines(&output))
  }

  fn create_tag(&self, name: &str) -> RailResult<()> {
    self.run(&["tag", name])?;
    Ok(())
  }

  fn stage(&self, paths: &[PathBuf]) -> RailResult<()> {
    if paths.is_empty() {
      return Ok(());
    }
    let paths: Vec<String> = paths.iter().map(|p| path_to_git_format(p)).collect();
    let mut args = vec!["add", "--"];
    args.extend(paths.iter().map(String::as_str));
    self.run(&args)?;
    Ok(())
  }

  fn staged_paths(&self) -> RailResult<Vec<String>> {
    let output = self.run(&["diff", "--cached", "--name-only", "--relative"])?;
    Ok(output_lines(&output))
  }

  fn commit(&self, subject: &str, body: &str) -> RailResult<()> {
    let mut args = vec!["commit", "-m", subject];
    if !body.is_empty() {
      args.extend(["-m", body]);
    }
    self.run(&args)?;
    Ok(())
  }

  fn push(&self) -> RailResult<()> {
    for args in [&["push"][..], &["push", "--tags"][..]] {
      let output = self
        .git_cmd()
        .args(args)
        .output()
        .context("Failed to push")?;

      if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RailError::Git(GitError::PushFailed {
          reason: stderr.trim().to_string(),
        }));
      }
    }
    Ok(())
  }
}
