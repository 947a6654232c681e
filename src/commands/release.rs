//! `wheel-rail release`

use crate::core::builder::CommandBuilder;
use crate::core::context::WorkspaceContext;
use crate::core::error::RailResult;
use crate::core::host::github::GhCli;
use crate::core::vcs::SystemGit;
use crate::release::{Pipeline, ReleaseOptions};

/// Run the full release pipeline against git, the GitHub CLI and the build command
pub fn run_release(ctx: &WorkspaceContext, release_tag: Option<String>, force_all: bool) -> RailResult<()> {
  let vcs = SystemGit::open(&ctx.root)?;
  let host = GhCli::new(&ctx.root);
  let builder = CommandBuilder::new(&ctx.config.build_command, &ctx.root);

  let options = ReleaseOptions { force_all, release_tag };
  let outcome = Pipeline::new(ctx, &vcs, &host, &builder).run(&options)?;

  tracing::debug!(
    "release {} (plan {}): {} bumped, {} wheels published, {} unchanged packages without a wheel",
    outcome.release_tag,
    outcome.plan.id()?,
    outcome.bumps.len(),
    outcome.artifacts.len(),
    outcome.reuse.missing.len()
  );
  Ok(())
}
