use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

use super::program::{DescriptorProfile, DescriptorProgram};

/// Boots sandbox instances.
pub trait SandboxRuntime: Send + Sync {
    /// Instance type produced by this runtime.
    type Instance: SandboxInstance;

    /// Boot a fresh instance running `program` under `profile`.
    ///
    /// Failures are reported as `TypesError::RuntimeBoot`.
    fn boot(
        &self,
        program: DescriptorProgram,
        profile: &DescriptorProfile,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Instance>> + Send + '_>>;
}

/// A booted sandbox instance.
///
/// `dispose` takes the instance by value, so it runs at most once.
pub trait SandboxInstance: Send + 'static {
    /// Send one request and buffer the full response body.
    ///
    /// Failures are reported as `TypesError::Dispatch`.
    fn dispatch(
        &self,
        request: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;

    /// Tear down the instance and release its resources.
    fn dispose(self) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;
}
