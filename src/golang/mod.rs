//! Go toolchain introspection
//!
//! Thin wrapper over `go list`. Returns raw text; the dependency report is
//! parsed by `crate::graph::DependencyGraph`.

pub mod toolchain;

pub use toolchain::GoToolchain;
