use crate::core::error::{AffectedError, AffectedResult, ToolError};
use crate::graph::ReportFormat;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// `go` invocations for one module directory
pub struct GoToolchain {
  binary: String,
  module_dir: PathBuf,
}

impl GoToolchain {
  pub fn new(binary: impl Into<String>, module_dir: &Path) -> Self {
    Self {
      binary: binary.into(),
      module_dir: module_dir.to_path_buf(),
    }
  }

  /// Module path of the current module (`go list -m`)
  pub fn current_module(&self) -> AffectedResult<String> {
    let stdout = self.run(&["list".to_string(), "-m".to_string()])?;
    let module = stdout.trim();

    if module.is_empty() || module.contains('\n') {
      return Err(AffectedError::with_help(
        format!("Expected a single module from `go list -m`, got: {:?}", module),
        "Run from a single-module directory or pass --module <path>.",
      ));
    }

    Ok(module.to_string())
  }

  /// Dependency report for `patterns`, one package per line in `format`
  ///
  /// Each line holds a package's import path and its full transitive
  /// dependency list, standard library included.
  pub fn dependency_report(&self, patterns: &[String], format: &ReportFormat) -> AffectedResult<String> {
    let mut args = vec!["list".to_string(), "-f".to_string(), format.go_list_template()];
    args.extend(patterns.iter().cloned());
    self.run(&args)
  }

  /// Command line for `dependency_report`, for dry runs
  pub fn describe_dependency_report(&self, patterns: &[String], format: &ReportFormat) -> String {
    format!(
      "{} list -f '{}' {}",
      self.binary,
      format.go_list_template(),
      patterns.join(" ")
    )
  }

  fn run(&self, args: &[String]) -> AffectedResult<String> {
    let command = format!("{} {}", self.binary, args.join(" "));
    tracing::info!(command = %command, dir = %self.module_dir.display(), "running");

    let output = match Command::new(&self.binary)
      .current_dir(&self.module_dir)
      .args(args)
      .output()
    {
      Ok(output) => output,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(AffectedError::Tool(ToolError::NotFound {
          binary: self.binary.clone(),
        }));
      }
      Err(e) => return Err(e.into()),
    };

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(AffectedError::Tool(ToolError::CommandFailed {
        command,
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(String::from_utf8(output.stdout)?)
  }
}
