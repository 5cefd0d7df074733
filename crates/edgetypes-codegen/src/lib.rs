//! Runtime type generation for edge worker projects.
//!
//! Resolves where the declaration file goes, boots a sandbox running the type
//! descriptor program, asks it for the declarations matching a compatibility
//! configuration, and writes them to disk atomically.

pub mod output;
pub mod persist;
pub mod runtime_types;

pub use output::{OutputTarget, DEFAULT_RUNTIME_TYPES_PATH};
pub use runtime_types::RuntimeTypesGenerator;
