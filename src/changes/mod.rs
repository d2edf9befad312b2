//! Change signals extracted from git output
//!
//! - **local**: changed local packages, from a changed-file listing
//! - **modules**: changed external modules, from a lock manifest diff
//!
//! Both are pure text → set functions; running git is the caller's job.

pub mod local;
pub mod modules;

pub use local::{SourceFilter, changed_local_packages};
pub use modules::changed_modules;
