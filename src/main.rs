mod commands;
mod core;
mod graph;
mod pyproject;
mod release;
mod ui;
mod utils;
mod workspace;

use clap::{Parser, Subcommand};
use core::context::WorkspaceContext;
use core::error::{RailError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Release orchestrator for uv workspaces: rebuild only what changed, reuse the rest
#[derive(Parser)]
#[command(name = "wheel-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Show debug diagnostics
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build changed packages, reuse unchanged wheels, tag, bump and publish a release
  Release {
    /// Release tag (e.g. r1, r2); the next free one when omitted
    #[arg(short = 'r', long = "release")]
    release: Option<String>,
    /// Rebuild every package regardless of changes
    #[arg(long)]
    force_all: bool,
  },

  /// Show what the next release would build and reuse (no side effects)
  Plan {
    /// Treat every package as changed
    #[arg(long)]
    force_all: bool,
    /// Output the plan in JSON format (useful for CI/automation)
    #[arg(long)]
    json: bool,
  },

  /// Scaffold the GitHub Actions release workflow
  Init {
    /// Directory to write release.yml into
    #[arg(long, default_value = ".github/workflows")]
    workflow_dir: PathBuf,
    /// Multi-job workflow with one build job per package and runner
    #[arg(long)]
    matrix: bool,
  },

  /// Individual pipeline steps for the matrix workflow
  #[command(subcommand)]
  Steps(StepCommands),
}

#[derive(Subcommand)]
enum StepCommands {
  /// Plan the release and write GitHub step outputs
  Discover {
    /// Path to the GitHub step output file ($GITHUB_OUTPUT)
    #[arg(long)]
    github_output: PathBuf,
    /// Release tag; the next free one when omitted
    #[arg(short = 'r', long = "release")]
    release: Option<String>,
    /// Treat every package as changed
    #[arg(long)]
    force_all: bool,
  },

  /// Build one package if it is in the changed set
  Build {
    /// Package to build
    #[arg(long)]
    package: String,
    /// JSON array of changed package names
    #[arg(long)]
    changed: String,
  },

  /// Reuse unchanged wheels, then tag, bump, commit, publish and push
  Release {
    /// JSON array of changed package names
    #[arg(long)]
    changed: String,
    /// JSON array of unchanged package names
    #[arg(long)]
    unchanged: String,
    /// Release tag to publish
    #[arg(long)]
    release_tag: String,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: bool) {
  // RUST_LOG wins over --verbose
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("wheel_rail=debug")
    } else {
      EnvFilter::new("wheel_rail=info")
    }
  });

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .without_time()
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(RailError::from(e).context("Failed to get current directory")),
  };

  // init runs before the workspace is necessarily valid and does its own checks
  if let Commands::Init { workflow_dir, matrix } = &cli.command {
    if let Err(err) = commands::run_init(&workspace_root, workflow_dir, *matrix) {
      handle_error(err);
    }
    return;
  }

  // Discover once; every other command works on the same context
  let ctx = match WorkspaceContext::build(&workspace_root) {
    Ok(ctx) => ctx,
    Err(err) => handle_error(err),
  };
  tracing::debug!("{} packages in {}", ctx.registry.len(), ctx.root.display());

  let result = match cli.command {
    Commands::Release { release, force_all } => commands::run_release(&ctx, release, force_all),
    Commands::Plan { force_all, json } => commands::run_plan(&ctx, force_all, json),
    Commands::Init { .. } => Ok(()),
    Commands::Steps(step_cmd) => match step_cmd {
      StepCommands::Discover {
        github_output,
        release,
        force_all,
      } => commands::run_step_discover(&ctx, &github_output, release, force_all),
      StepCommands::Build { package, changed } => commands::run_step_build(&ctx, &package, &changed),
      StepCommands::Release {
        changed,
        unchanged,
        release_tag,
      } => commands::run_step_release(&ctx, &changed, &unchanged, &release_tag),
    },
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RailError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
