//! Integration tests for the affected-packages binary

use crate::helpers::{MODULE, TestModule, git, run_affected, run_affected_unchecked, stdout_lines};
use anyhow::Result;

fn pkg(name: &str) -> String {
  format!("{}/{}", MODULE, name)
}

/// Common offline-go arguments: module root and dependency report from files
fn offline_go_args(module: &TestModule) -> Result<Vec<String>> {
  let report = module.write_deps_report()?;
  Ok(vec![
    "--module".to_string(),
    MODULE.to_string(),
    "--deps-report".to_string(),
    report.display().to_string(),
  ])
}

fn run(module: &TestModule, extra: &[&str]) -> Result<Vec<String>> {
  let go_args = offline_go_args(module)?;
  let mut args: Vec<&str> = go_args.iter().map(String::as_str).collect();
  args.extend_from_slice(extra);
  let output = run_affected(&module.path, &args)?;
  Ok(stdout_lines(&output))
}

#[test]
fn test_affected_local_change_propagates_to_dependents() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  module.write("money/money.go", "package money\n\nfunc Zero() int { return 0 }\n")?;
  module.commit("Change money")?;

  let lines = run(&module, &["--since", "base"])?;
  assert_eq!(lines, vec![pkg("api"), pkg("cart"), pkg("money")]);

  Ok(())
}

#[test]
fn test_affected_leaf_change_stays_local() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  module.write("api/handlers.go", "package api\n")?;
  module.commit("Add handlers")?;

  let lines = run(&module, &["--since", "base"])?;
  assert_eq!(lines, vec![pkg("api")]);

  Ok(())
}

#[test]
fn test_affected_module_bump() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  module.write(
    "go.sum",
    "github.com/acme/decimal v1.1.0 h1:eeee=\ngithub.com/acme/decimal v1.1.0/go.mod h1:ffff=\ngithub.com/acme/log v0.3.0 h1:cccc=\ngithub.com/acme/log v0.3.0/go.mod h1:dddd=\n",
  )?;
  module.commit("Bump decimal")?;

  let lines = run(&module, &["--since", "base"])?;
  assert_eq!(lines, vec![pkg("api"), pkg("cart")]);

  Ok(())
}

#[test]
fn test_affected_module_bump_reaches_subpackage_dependents() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  module.write(
    "go.sum",
    "github.com/acme/decimal v1.0.0 h1:aaaa=\ngithub.com/acme/decimal v1.0.0/go.mod h1:bbbb=\ngithub.com/acme/log v0.4.0 h1:gggg=\ngithub.com/acme/log v0.4.0/go.mod h1:hhhh=\n",
  )?;
  module.commit("Bump log")?;

  let lines = run(&module, &["--since", "base"])?;
  assert_eq!(lines, vec![pkg("api")]);

  Ok(())
}

#[test]
fn test_affected_ignores_vendor_and_non_source_files() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  module.write("vendor/github.com/acme/decimal/decimal.go", "package decimal\n")?;
  module.write("README.md", "# shop\n\nNow with docs.\n")?;
  module.write("go.mod", &format!("module {}\n\ngo 1.23\n", MODULE))?;
  module.commit("Vendor and docs")?;

  let lines = run(&module, &["--since", "base"])?;
  assert!(lines.is_empty(), "expected no output, got: {:?}", lines);

  Ok(())
}

#[test]
fn test_affected_without_lock_manifest() -> Result<()> {
  let module = TestModule::new()?;
  std::fs::remove_file(module.path.join("go.sum"))?;
  module.commit("Drop go.sum")?;
  git(&module.path, &["branch", "base"])?;

  module.write("cart/cart.go", "package cart\n\nvar Items []string\n")?;
  module.commit("Change cart")?;

  let lines = run(&module, &["--since", "base"])?;
  assert_eq!(lines, vec![pkg("api"), pkg("cart")]);

  Ok(())
}

#[test]
fn test_affected_no_changes() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  let lines = run(&module, &["--since", "base"])?;
  assert!(lines.is_empty(), "expected no output, got: {:?}", lines);

  Ok(())
}

#[test]
fn test_affected_sha_pair_and_raw_range() -> Result<()> {
  let module = TestModule::new()?;
  let sha1 = git(&module.path, &["rev-parse", "HEAD"])?;
  let sha1 = String::from_utf8_lossy(&sha1.stdout).trim().to_string();

  module.write("cart/cart.go", "package cart\n\nvar Total int\n")?;
  let sha2 = module.commit("Change cart")?;

  module.write("money/money.go", "package money\n\nvar Unit = 100\n")?;
  module.commit("Change money")?;

  let lines = run(&module, &["--from", &sha1, "--to", &sha2])?;
  assert_eq!(lines, vec![pkg("api"), pkg("cart")]);

  let range = format!("{}..{}", sha1, sha2);
  let lines = run(&module, &["--range", &range])?;
  assert_eq!(lines, vec![pkg("api"), pkg("cart")]);

  let lines = run(&module, &["--from", &sha2])?;
  assert_eq!(lines, vec![pkg("api"), pkg("cart"), pkg("money")]);

  Ok(())
}

#[test]
fn test_affected_base_ref_from_config() -> Result<()> {
  let module = TestModule::new()?;
  module.write("affected.toml", "[analysis]\nbase_ref = \"base\"\n")?;
  module.commit("Add config")?;
  git(&module.path, &["branch", "base"])?;

  module.write("money/money.go", "package money\n\nvar Unit = 1\n")?;
  module.commit("Change money")?;

  let lines = run(&module, &[])?;
  assert_eq!(lines, vec![pkg("api"), pkg("cart"), pkg("money")]);

  Ok(())
}

#[test]
fn test_affected_json_output() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  module.write("money/money.go", "package money\n\nvar Unit = 1\n")?;
  module.commit("Change money")?;

  let lines = run(&module, &["--since", "base", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_str(&lines.join("\n"))?;

  assert_eq!(json["changed_packages"], serde_json::json!([pkg("money")]));
  assert_eq!(json["impact"]["dependents"], serde_json::json!([pkg("api"), pkg("cart")]));
  assert_eq!(json["summary"]["affected_count"], 3);

  Ok(())
}

#[test]
fn test_affected_text_output() -> Result<()> {
  let module = TestModule::new()?;
  git(&module.path, &["branch", "base"])?;

  module.write("api/api.go", "package api\n\nvar Version = 2\n")?;
  module.commit("Change api")?;

  let lines = run(&module, &["--since", "base", "--format", "text"])?;
  assert_eq!(lines[0], "Affected Analysis");
  assert!(lines.contains(&"Affected packages: 1".to_string()), "got: {:?}", lines);

  Ok(())
}

#[test]
fn test_affected_offline_inputs_outside_git() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let write = |name: &str, content: &str| -> Result<String> {
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    Ok(path.display().to_string())
  };

  let report = write(
    "deps.txt",
    "test.com/m/a|fmt:ext.io/lib\ntest.com/m/b|fmt:test.com/m/a\ntest.com/m/c|ext.io/other\n",
  )?;
  let files = write("files.txt", "go.sum\nvendor/pkg/x.go\nwidget/config.go\n")?;
  let diff = write(
    "lock.diff",
    "--- a/go.sum\n+++ b/go.sum\n@@ -1 +1 @@\n-ext.io/lib v1.0.0 h1:x=\n+ext.io/lib v1.1.0 h1:y=\n",
  )?;

  let output = run_affected(
    dir.path(),
    &[
      "--module",
      "test.com/m",
      "--deps-report",
      &report,
      "--changed-files",
      &files,
      "--lock-diff",
      &diff,
    ],
  )?;

  assert_eq!(stdout_lines(&output), vec!["test.com/m/a", "test.com/m/widget"]);

  Ok(())
}

#[test]
fn test_affected_dry_run() -> Result<()> {
  let module = TestModule::new()?;

  let output = run_affected(&module.path, &["--dry-run", "--since", "base", "./cmd/..."])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY RUN: Would analyze base..HEAD"), "got: {}", stdout);
  assert!(stdout.contains("./cmd/..."), "got: {}", stdout);
  assert!(stdout.contains("go.sum"), "got: {}", stdout);

  Ok(())
}

#[test]
fn test_affected_unknown_ref_fails() -> Result<()> {
  let module = TestModule::new()?;
  let report = module.write_deps_report()?;
  let report = report.display().to_string();

  let output = run_affected_unchecked(
    &module.path,
    &["--module", MODULE, "--deps-report", &report, "--since", "no-such-ref"],
  )?;

  assert_eq!(output.status.code(), Some(2));
  assert!(output.stdout.is_empty());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Git command failed"));

  Ok(())
}

#[test]
fn test_affected_missing_input_file_fails() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let missing = dir.path().join("missing.txt").display().to_string();

  let output = run_affected_unchecked(
    dir.path(),
    &[
      "--module",
      "test.com/m",
      "--deps-report",
      &missing,
      "--changed-files",
      &missing,
      "--lock-diff",
      &missing,
    ],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read dependency report"));

  Ok(())
}

#[test]
fn test_affected_invalid_config_fails() -> Result<()> {
  let module = TestModule::new()?;
  module.write("affected.toml", "[go]\nrecord_separator = \":\"\n")?;

  let output = run_affected_unchecked(&module.path, &["--dry-run"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("go.item_separator"));

  Ok(())
}

#[test]
fn test_affected_missing_go_binary_is_system_error() -> Result<()> {
  let module = TestModule::new()?;
  module.write("affected.toml", "[go]\nbinary = \"no-such-go-binary-xyz\"\n")?;

  let output = run_affected_unchecked(&module.path, &["--since", "HEAD"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr);
  assert!(output.stdout.is_empty());
  assert!(stderr.contains("Could not run 'no-such-go-binary-xyz'"), "stderr: {}", stderr);
  assert!(stderr.contains("help:"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_affected_changed_files_with_dot_segments() -> Result<()> {
  let module = TestModule::new()?;
  let report = module.write_deps_report()?.display().to_string();
  module.write(".changed.txt", "./money/money.go\nmoney//extra.go\n")?;
  module.write(".lock.diff", "")?;
  let changed = module.path.join(".changed.txt").display().to_string();
  let lock_diff = module.path.join(".lock.diff").display().to_string();

  let output = run_affected(
    &module.path,
    &[
      "--module",
      MODULE,
      "--deps-report",
      &report,
      "--changed-files",
      &changed,
      "--lock-diff",
      &lock_diff,
    ],
  )?;

  assert_eq!(stdout_lines(&output), vec![pkg("api"), pkg("cart"), pkg("money")]);

  Ok(())
}
