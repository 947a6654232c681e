//! `wheel-rail plan`: dry run of change detection

use crate::core::context::WorkspaceContext;
use crate::core::error::RailResult;
use crate::core::vcs::SystemGit;
use crate::release::ReleasePlan;
use crate::release::markers::next_release_tag;

/// Print what the next release would build and reuse.
///
/// Reads tags and diffs only; nothing is built, tagged or published. An empty
/// plan is not an error here.
pub fn run_plan(ctx: &WorkspaceContext, force_all: bool, json: bool) -> RailResult<()> {
  let vcs = SystemGit::open(&ctx.root)?;
  let plan = ReleasePlan::analyze(ctx, &vcs, force_all)?;

  if json {
    let release_tag = next_release_tag(&vcs)?;
    println!("{}", plan.to_json(Some(&release_tag))?);
    return Ok(());
  }

  println!("📦 {} packages in build order:", ctx.order.len());
  println!("  {}", ctx.order.join(" → "));
  println!();
  print!("{}", plan.to_human_readable());
  println!();
  if plan.is_empty() {
    println!("Nothing to release.");
  } else {
    println!("Plan {}: {} to build, {} to reuse", plan.id()?.short(), plan.changed.len(), plan.unchanged.len());
  }
  Ok(())
}
