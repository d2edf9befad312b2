//! `affected-packages` - Show which Go packages are affected by changes
//!
//! Gathers three inputs, either from git and the go toolchain or from files:
//! - the dependency report (`go list -f ...`)
//! - the changed file listing (`git diff --name-only`)
//! - the lock manifest diff (`git diff -- go.sum`)
//!
//! and prints the packages that changed or depend on something that changed.

use crate::changes::{changed_local_packages, changed_modules};
use crate::core::context::ProjectContext;
use crate::core::error::{AffectedError, AffectedResult, ConfigError, ResultExt};
use crate::core::vcs::{RevisionRange, SystemGit};
use crate::golang::GoToolchain;
use crate::graph::{AffectedAnalysis, DependencyGraph};
use std::fs;
use std::path::{Path, PathBuf};

/// Output format for affected command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  fn from_str(s: &str) -> AffectedResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(AffectedError::message(format!(
        "Unknown format '{}'. Valid formats: names, text, json",
        s
      ))),
    }
  }
}

/// Options of the affected command, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct AffectedOptions {
  /// Package patterns for `go list` (empty: use config)
  pub packages: Vec<String>,
  /// Base ref for `<since>..HEAD` (None: use config)
  pub since: Option<String>,
  pub from: Option<String>,
  pub to: Option<String>,
  /// Verbatim git range
  pub range: Option<String>,
  pub format: String,
  pub dry_run: bool,
  /// Read the dependency report from this file instead of running go
  pub deps_report: Option<PathBuf>,
  /// Read the changed file listing from this file instead of running git
  pub changed_files: Option<PathBuf>,
  /// Read the lock manifest diff from this file instead of running git
  pub lock_diff: Option<PathBuf>,
  /// Module root identifier (None: `go list -m`)
  pub module: Option<String>,
}

/// Run the affected command
pub fn run_affected(ctx: &ProjectContext, opts: AffectedOptions) -> AffectedResult<()> {
  let output_format = OutputFormat::from_str(&opts.format)?;
  let range = revision_range(ctx, &opts)?;
  let patterns = if opts.packages.is_empty() {
    ctx.config.analysis.packages.clone()
  } else {
    opts.packages.clone()
  };

  if opts.dry_run {
    display_plan(ctx, &opts, &range, &patterns);
    return Ok(());
  }

  let analysis = gather_and_analyze(ctx, &opts, &range, &patterns)?;
  if analysis.impact.is_empty() {
    tracing::info!("no affected packages");
  }
  print!("{}", render(&analysis, output_format)?);

  Ok(())
}

/// Pick the revision range from the flags, falling back to `<base_ref>..HEAD`
fn revision_range(ctx: &ProjectContext, opts: &AffectedOptions) -> AffectedResult<RevisionRange> {
  let conflict = |message: &str| -> AffectedResult<RevisionRange> {
    Err(AffectedError::Config(ConfigError::Conflict {
      message: message.to_string(),
    }))
  };

  match (&opts.range, &opts.since, &opts.from, &opts.to) {
    (Some(range), None, None, None) => Ok(RevisionRange::Raw(range.clone())),
    (Some(_), _, _, _) => conflict("--range cannot be combined with --since, --from or --to"),
    (None, Some(_), Some(_), _) => conflict("--since cannot be combined with --from/--to"),
    (None, _, Some(from), Some(to)) => Ok(RevisionRange::Between {
      from: from.clone(),
      to: to.clone(),
    }),
    (None, _, Some(from), None) => Ok(RevisionRange::Between {
      from: from.clone(),
      to: "HEAD".to_string(),
    }),
    (None, _, None, Some(_)) => conflict("--to requires --from"),
    (None, Some(since), None, None) => Ok(RevisionRange::Since(since.clone())),
    (None, None, None, None) => Ok(RevisionRange::Since(ctx.config.analysis.base_ref.clone())),
  }
}

/// Collect the three inputs, parse them and resolve the affected set
fn gather_and_analyze(
  ctx: &ProjectContext,
  opts: &AffectedOptions,
  range: &RevisionRange,
  patterns: &[String],
) -> AffectedResult<AffectedAnalysis> {
  let root = ctx.project_root();
  let go = GoToolchain::new(ctx.config.go.binary.clone(), root);
  let git = if opts.changed_files.is_none() || opts.lock_diff.is_none() {
    Some(SystemGit::open(root)?)
  } else {
    None
  };

  let report_format = ctx.report_format();
  let report = match &opts.deps_report {
    Some(path) => read_input(path, "dependency report")?,
    None => go
      .dependency_report(patterns, &report_format)
      .context("Failed to list package dependencies")?,
  };

  let module_root = match &opts.module {
    Some(module) => module.clone(),
    None => go.current_module().context("Failed to determine the module root")?,
  };

  let listing = match (&opts.changed_files, &git) {
    (Some(path), _) => read_input(path, "changed file listing")?,
    (None, Some(git)) => git.changed_file_names(range)?,
    (None, None) => String::new(),
  };

  let lock_diff = match (&opts.lock_diff, &git) {
    (Some(path), _) => read_input(path, "lock manifest diff")?,
    (None, Some(git)) => {
      if ctx.lock_manifest_path().exists() {
        git.diff_file(range, &ctx.config.go.lock_manifest)?
      } else {
        tracing::info!(
          manifest = %ctx.config.go.lock_manifest.display(),
          "no lock manifest, skipping module changes"
        );
        String::new()
      }
    }
    (None, None) => String::new(),
  };

  let graph = DependencyGraph::parse(&report, &report_format);
  if graph.is_empty() {
    tracing::warn!("dependency report lists no packages; only directly changed packages will be reported");
  }
  let local_changes = changed_local_packages(&listing, &module_root, &ctx.source_filter());
  let module_changes = changed_modules(&lock_diff);

  tracing::info!(
    module = %module_root,
    packages = graph.len(),
    changed_packages = local_changes.len(),
    changed_modules = module_changes.len(),
    "resolving affected packages"
  );

  Ok(crate::graph::affected::analyze(&graph, local_changes, module_changes))
}

fn read_input(path: &Path, what: &str) -> AffectedResult<String> {
  tracing::info!(path = %path.display(), "reading {}", what);
  // Missing input files are user errors
  fs::read_to_string(path).map_err(|e| {
    AffectedError::with_help(
      format!("Failed to read {} from {}: {}", what, path.display(), e),
      "Check the file path passed on the command line.",
    )
  })
}

/// Show what would be run, without running it
fn display_plan(ctx: &ProjectContext, opts: &AffectedOptions, range: &RevisionRange, patterns: &[String]) {
  let go = GoToolchain::new(ctx.config.go.binary.clone(), ctx.project_root());
  let range_arg = range.to_git_arg();

  println!("DRY RUN: Would analyze {}", range_arg);
  println!("  root: {}", ctx.project_root().display());

  match &opts.module {
    Some(module) => println!("  module: {}", module),
    None => println!("  module: {} list -m", ctx.config.go.binary),
  }

  match &opts.deps_report {
    Some(path) => println!("  dependencies: {}", path.display()),
    None => println!(
      "  dependencies: {}",
      go.describe_dependency_report(patterns, &ctx.report_format())
    ),
  }

  match &opts.changed_files {
    Some(path) => println!("  changed files: {}", path.display()),
    None => println!("  changed files: git diff --name-only --relative {}", range_arg),
  }

  let manifest = ctx.config.go.lock_manifest.display();
  match &opts.lock_diff {
    Some(path) => println!("  module changes: {}", path.display()),
    None if ctx.lock_manifest_path().exists() => {
      println!("  module changes: git diff --relative {} -- {}", range_arg, manifest)
    }
    None => println!("  module changes: none ({} not found)", manifest),
  }
}

/// Render analysis results in the requested format
fn render(analysis: &AffectedAnalysis, format: OutputFormat) -> AffectedResult<String> {
  match format {
    OutputFormat::Text => Ok(render_text(analysis)),
    OutputFormat::Json => render_json(analysis),
    OutputFormat::NamesOnly => Ok(render_names_only(analysis)),
  }
}

/// Human-readable text format
fn render_text(analysis: &AffectedAnalysis) -> String {
  let impact = &analysis.impact;
  let targets = impact.targets();

  let mut out = String::from("Affected Analysis\n=================\n");
  section(&mut out, "Changed packages", &analysis.changed_packages);
  section(&mut out, "Changed modules", &analysis.changed_modules);
  section(&mut out, "Dependents of changed packages", &impact.dependents);
  section(&mut out, "Dependents of changed modules", &impact.module_dependents);
  section(&mut out, "Affected packages", &targets);
  out
}

fn section<'a>(out: &mut String, title: &str, items: impl IntoIterator<Item = &'a String>) {
  let items: Vec<&String> = items.into_iter().collect();
  out.push_str(&format!("\n{}: {}\n", title, items.len()));
  for item in items {
    out.push_str(&format!("  {}\n", item));
  }
}

/// JSON format
fn render_json(analysis: &AffectedAnalysis) -> AffectedResult<String> {
  use serde_json::json;

  let impact = &analysis.impact;
  let targets = impact.targets();

  let output = json!({
      "changed_packages": analysis.changed_packages,
      "changed_modules": analysis.changed_modules,
      "impact": {
          "direct": impact.direct,
          "dependents": impact.dependents,
          "module_dependents": impact.module_dependents,
          "affected": targets
      },
      "summary": {
          "changed_packages_count": analysis.changed_packages.len(),
          "changed_modules_count": analysis.changed_modules.len(),
          "affected_count": targets.len()
      }
  });

  Ok(serde_json::to_string_pretty(&output)? + "\n")
}

/// One affected package per line, nothing when nothing is affected
fn render_names_only(analysis: &AffectedAnalysis) -> String {
  analysis
    .impact
    .targets()
    .into_iter()
    .map(|name| name + "\n")
    .collect()
}
