//! Runtime type generation.
//!
//! One invocation runs through these states:
//!
//! ```text
//! Idle -> Validating -> Booting -> Requesting -> Writing+Disposing -> Done
//! ```
//!
//! Configuration errors stop in `Validating` before any filesystem or sandbox
//! work. Once booted, the sandbox is disposed on every path out of
//! `Requesting` and `Writing`. Nothing is retried here.

use std::path::{Path, PathBuf};

use edgetypes_core::config::DESCRIPTOR_PROGRAM_PATH;
use edgetypes_core::{
    CompatibilityConfig, DescriptorProgram, ProjectConfig, Result, SandboxInstance,
    SandboxRuntime, DESCRIPTOR_PROFILE,
};
use tracing::{debug, info, warn};

use crate::output::OutputTarget;
use crate::persist::{ensure_parent_dir, write_atomic};

/// Generates runtime declaration files through a sandbox runtime.
pub struct RuntimeTypesGenerator<R> {
    runtime: R,
    program_path: PathBuf,
}

impl<R: SandboxRuntime> RuntimeTypesGenerator<R> {
    /// Create a generator loading the descriptor program from its default path.
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            program_path: PathBuf::from(DESCRIPTOR_PROGRAM_PATH),
        }
    }

    /// Load the descriptor program from `path` instead.
    pub fn with_program(mut self, path: impl Into<PathBuf>) -> Self {
        self.program_path = path.into();
        self
    }

    /// Create a generator configured from a loaded project.
    pub fn for_project(runtime: R, project: &ProjectConfig) -> Self {
        Self::new(runtime).with_program(project.descriptor_program_path())
    }

    /// Path the descriptor program is loaded from.
    pub fn program_path(&self) -> &Path {
        &self.program_path
    }

    /// Generate runtime types for a project and write them to disk.
    ///
    /// Resolves the output target and validates the compatibility date before
    /// touching the filesystem. Returns the path written.
    pub async fn generate_runtime_types(
        &self,
        project: &ProjectConfig,
        out_file: Option<&Path>,
    ) -> Result<PathBuf> {
        let target = OutputTarget::for_project(project, out_file)?;
        let compat = project.compatibility()?;

        self.synthesize(&target, &compat).await?;
        Ok(target.into_path_buf())
    }

    /// Generate declarations for `compat` and write them to `target`.
    ///
    /// `compat` is trusted as already validated.
    pub async fn synthesize(
        &self,
        target: &OutputTarget,
        compat: &CompatibilityConfig,
    ) -> Result<()> {
        let out_file = target.path();
        ensure_parent_dir(out_file).await?;

        let (instance, declarations) = self.request(compat).await?;

        debug!(
            out_file = %out_file.display(),
            bytes = declarations.len(),
            "Writing runtime types"
        );
        let (written, disposed) = tokio::join!(
            write_atomic(out_file.to_path_buf(), declarations),
            instance.dispose()
        );
        log_dispose_failure(disposed);
        written?;

        info!(out_file = %out_file.display(), "Generated runtime types");
        Ok(())
    }

    /// Generate declarations for `compat` without writing them.
    pub async fn generate(&self, compat: &CompatibilityConfig) -> Result<String> {
        let (instance, declarations) = self.request(compat).await?;
        log_dispose_failure(instance.dispose().await);
        Ok(declarations)
    }

    /// Boot a sandbox and dispatch the encoded request.
    ///
    /// On success the caller owns the instance and must dispose it. On
    /// dispatch failure it has already been disposed.
    async fn request(&self, compat: &CompatibilityConfig) -> Result<(R::Instance, String)> {
        let program = DescriptorProgram::load(&self.program_path).await?;

        debug!(program = %self.program_path.display(), "Booting type descriptor sandbox");
        let instance = self.runtime.boot(program, &DESCRIPTOR_PROFILE).await?;

        let request = compat.request_path();
        debug!(%request, "Requesting runtime types");

        let dispatched = instance.dispatch(&request).await;
        match dispatched {
            Ok(declarations) => Ok((instance, declarations)),
            Err(e) => {
                log_dispose_failure(instance.dispose().await);
                Err(e)
            }
        }
    }
}

fn log_dispose_failure(result: Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "Failed to dispose type descriptor sandbox");
    }
}
