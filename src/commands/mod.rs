pub mod affected;

pub use affected::{AffectedOptions, run_affected};
