//! Changed external modules from a unified diff of the lock manifest
//!
//! Lock lines look like `<module> <version>[/go.mod] <hash>`. Only added lines
//! are inspected: a bump shows up as a removed line plus an added line, and the
//! added line is enough to report it. Pure removals are not reported.

use std::collections::BTreeSet;

/// Modules whose locked version changed in `diff`.
///
/// Everything up to and including the first `+++` header line is skipped.
/// After that, added lines that split into exactly three whitespace-separated
/// fields contribute their first field. Hunk headers, later file headers and
/// context lines never match.
pub fn changed_modules(diff: &str) -> BTreeSet<String> {
  let mut modules = BTreeSet::new();
  let mut lines = diff.lines();

  if !lines.by_ref().any(|line| line.starts_with("+++")) {
    tracing::debug!("no file header in lock manifest diff");
    return modules;
  }

  for line in lines {
    let Some(added) = line.strip_prefix('+') else {
      continue;
    };

    let fields: Vec<&str> = added.split_whitespace().collect();
    if let [module, _version, _hash] = fields.as_slice() {
      modules.insert(module.to_string());
    }
  }

  tracing::debug!(modules = modules.len(), "extracted changed modules");
  modules
}
