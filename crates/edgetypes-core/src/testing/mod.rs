//! Testing utilities for runtime type generation.
//!
//! Provides a deterministic in-memory sandbox so generation can be exercised
//! without launching workerd.
//!
//! # Example
//!
//! ```ignore
//! let sandbox = MockSandbox::responding("declare const X: string;");
//! generator.generate(&compat).await?;
//!
//! sandbox.assert_dispatched("http://dummy.com/2024-01-01");
//! sandbox.assert_disposed_once();
//! ```

pub mod mock_sandbox;

pub use mock_sandbox::{BootRecord, MockInstance, MockSandbox};
