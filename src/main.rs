mod changes;
mod commands;
mod core;
mod golang;
mod graph;
mod ui;

use clap::{ArgAction, Parser};
use commands::AffectedOptions;
use crate::core::error::{AffectedError, print_error};
use std::path::PathBuf;

/// List the Go packages affected by a git change range
///
/// A package is affected when one of its source files changed, when it depends
/// on a changed package, or when it depends on a module whose version changed
/// in go.sum. Prints one package per line, sorted.
#[derive(Parser)]
#[command(name = "affected-packages")]
#[command(version, about, long_about)]
#[command(styles = get_styles())]
struct Cli {
  /// Package patterns to analyze (default: ./..., or `analysis.packages` from affected.toml)
  packages: Vec<String>,

  /// Git ref to compare HEAD against (default: origin/main, or `analysis.base_ref`)
  #[arg(long)]
  since: Option<String>,
  /// Start ref (for SHA pair mode)
  #[arg(long, conflicts_with = "since")]
  from: Option<String>,
  /// End ref (for SHA pair mode, default: HEAD)
  #[arg(long, requires = "from")]
  to: Option<String>,
  /// Git revision range passed through verbatim (e.g. main...feature)
  #[arg(long, conflicts_with_all = ["since", "from", "to"])]
  range: Option<String>,

  /// Output format: names (default), text, json
  #[arg(long, default_value = "names")]
  format: String,
  /// Show the inputs that would be gathered, without running anything
  #[arg(long)]
  dry_run: bool,

  /// Read the dependency report from a file instead of running `go list`
  #[arg(long, value_name = "FILE")]
  deps_report: Option<PathBuf>,
  /// Read changed file paths from a file instead of running `git diff --name-only`
  #[arg(long, value_name = "FILE")]
  changed_files: Option<PathBuf>,
  /// Read the lock manifest diff from a file instead of running `git diff`
  #[arg(long, value_name = "FILE")]
  lock_diff: Option<PathBuf>,
  /// Module path of the project instead of running `go list -m`
  #[arg(long, value_name = "PATH")]
  module: Option<String>,

  /// Module root directory (default: current directory)
  #[arg(short = 'C', long = "dir", value_name = "DIR")]
  dir: Option<PathBuf>,
  /// Increase log verbosity on stderr (-v, -vv, -vvv)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,
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

fn main() {
  let cli = Cli::parse();
  ui::logging::init(cli.verbose);

  let root = match cli.dir {
    Some(dir) => dir,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(AffectedError::message(format!(
        "Failed to get current directory: {}",
        e
      ))),
    },
  };

  let ctx = match crate::core::context::ProjectContext::build(&root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let opts = AffectedOptions {
    packages: cli.packages,
    since: cli.since,
    from: cli.from,
    to: cli.to,
    range: cli.range,
    format: cli.format,
    dry_run: cli.dry_run,
    deps_report: cli.deps_report,
    changed_files: cli.changed_files,
    lock_diff: cli.lock_diff,
    module: cli.module,
  };

  if let Err(err) = commands::run_affected(&ctx, opts) {
    handle_error(err);
  }
}

fn handle_error(err: AffectedError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
