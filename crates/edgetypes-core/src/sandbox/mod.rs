//! Sandbox collaborator contract.
//!
//! A sandbox runtime boots an isolated instance running the type descriptor
//! program, answers requests against it, and is disposed afterwards.

mod program;
mod traits;

pub use program::{DescriptorProfile, DescriptorProgram, DESCRIPTOR_PROFILE};
pub use traits::{SandboxInstance, SandboxRuntime};
