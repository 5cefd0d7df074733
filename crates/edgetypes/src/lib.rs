//! edgetypes - runtime type declarations for edge worker projects.
//!
//! Generates TypeScript ambient declarations describing exactly the runtime
//! APIs enabled by a project's compatibility date and flags.

use std::path::{Path, PathBuf};

pub use edgetypes_codegen::{OutputTarget, RuntimeTypesGenerator, DEFAULT_RUNTIME_TYPES_PATH};
pub use edgetypes_core::config::DEFAULT_CONFIG_FILE;
pub use edgetypes_core::{
    CompatibilityConfig, ErrorKind, ProjectConfig, Result, RuntimeConfig, TypesError,
};
pub use edgetypes_runtime::WorkerdRuntime;

/// Generate runtime types for `project` using workerd.
///
/// Writes to `out_file` when given, otherwise to the default location next to
/// the project config. Returns the path written.
pub async fn generate_runtime_types(
    project: &ProjectConfig,
    out_file: Option<&Path>,
) -> Result<PathBuf> {
    let runtime = WorkerdRuntime::from_config(&project.runtime);
    RuntimeTypesGenerator::for_project(runtime, project)
        .generate_runtime_types(project, out_file)
        .await
}
