pub mod compat;
pub mod config;
pub mod error;
pub mod sandbox;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use compat::{CompatibilityConfig, DESCRIPTOR_AUTHORITY};
pub use config::{ProjectConfig, RuntimeConfig};
pub use error::{ErrorKind, Result, TypesError};
pub use sandbox::{
    DescriptorProfile, DescriptorProgram, SandboxInstance, SandboxRuntime, DESCRIPTOR_PROFILE,
};
