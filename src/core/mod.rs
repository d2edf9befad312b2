//! Core building blocks shared by all commands
//!
//! - **config**: affected.toml parsing and validation
//! - **context**: project root and configuration, built once in main.rs
//! - **error**: error types with contextual help messages and exit codes
//! - **vcs**: git operations (SystemGit) and revision ranges

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
