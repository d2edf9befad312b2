//! Affected package analysis
//!
//! Given changed local packages and changed external modules, determine:
//! - Which packages changed directly
//! - Which local packages list a changed package among their dependencies
//! - Which local packages depend on a changed module or anything inside it

use super::dependency_graph::DependencyGraph;
use std::collections::BTreeSet;

/// Set of affected packages, split by the reason they were affected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffectedSet {
  /// Packages containing changed files
  pub direct: BTreeSet<String>,

  /// Local packages depending on a directly changed package
  pub dependents: BTreeSet<String>,

  /// Local packages depending on a changed module
  pub module_dependents: BTreeSet<String>,
}

impl AffectedSet {
  /// Union of all three sets, sorted and deduplicated.
  pub fn targets(&self) -> Vec<String> {
    let all: BTreeSet<&String> = self
      .direct
      .iter()
      .chain(&self.dependents)
      .chain(&self.module_dependents)
      .collect();
    all.into_iter().cloned().collect()
  }

  pub fn is_empty(&self) -> bool {
    self.direct.is_empty() && self.dependents.is_empty() && self.module_dependents.is_empty()
  }
}

/// Complete affected analysis.
#[derive(Debug, Clone)]
pub struct AffectedAnalysis {
  /// Local packages with changed source files
  pub changed_packages: BTreeSet<String>,

  /// External modules with a changed locked version
  pub changed_modules: BTreeSet<String>,

  /// Impact set
  pub impact: AffectedSet,
}

/// Resolve which packages are affected by the given changes.
///
/// Algorithm:
/// 1. Every changed package is affected, whether or not the graph knows it
/// 2. Every local package listing a changed package as a dependency is affected
/// 3. Every local package depending on a changed module `m`, or on an
///    identifier under `m/`, is affected
///
/// The dependency sets in the graph are already transitive, so one reverse
/// lookup per change covers indirect dependents as well.
pub fn resolve(
  graph: &DependencyGraph,
  changed_packages: &BTreeSet<String>,
  changed_modules: &BTreeSet<String>,
) -> AffectedSet {
  let mut impact = AffectedSet {
    direct: changed_packages.clone(),
    ..Default::default()
  };

  for package in changed_packages {
    if !graph.contains(package) {
      tracing::debug!(package = %package, "changed package is not in the dependency graph");
    }
    impact.dependents.extend(graph.dependents_of(package));
  }

  for module in changed_modules {
    let dependents = graph.dependents_of_module(module);
    tracing::debug!(module = %module, dependents = dependents.len(), "resolved module dependents");
    impact.module_dependents.extend(dependents);
  }

  impact
}

/// Run [`resolve`] and keep the inputs alongside the result for reporting.
pub fn analyze(
  graph: &DependencyGraph,
  changed_packages: BTreeSet<String>,
  changed_modules: BTreeSet<String>,
) -> AffectedAnalysis {
  let impact = resolve(graph, &changed_packages, &changed_modules);

  AffectedAnalysis {
    changed_packages,
    changed_modules,
    impact,
  }
}
