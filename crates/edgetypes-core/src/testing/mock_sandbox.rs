//! Mock sandbox runtime for testing.
//!
//! Records boots, dispatched requests and disposals for verification, and
//! can be configured to fail at boot or dispatch.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{Result, TypesError};
use crate::sandbox::{DescriptorProfile, DescriptorProgram, SandboxInstance, SandboxRuntime};

/// Record of a sandbox boot.
#[derive(Debug, Clone)]
pub struct BootRecord {
    /// Program source the sandbox was booted with.
    pub program_source: String,
    /// Profile the sandbox was booted under.
    pub profile: DescriptorProfile,
}

#[derive(Debug, Clone)]
enum Behavior {
    Respond(String),
    FailBoot(String),
    FailDispatch(String),
}

struct MockState {
    behavior: RwLock<Behavior>,
    boots: RwLock<Vec<BootRecord>>,
    requests: RwLock<Vec<String>>,
    disposals: AtomicUsize,
}

/// Mock sandbox runtime.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the generator owns another.
#[derive(Clone)]
pub struct MockSandbox {
    state: Arc<MockState>,
}

impl MockSandbox {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            state: Arc::new(MockState {
                behavior: RwLock::new(behavior),
                boots: RwLock::new(Vec::new()),
                requests: RwLock::new(Vec::new()),
                disposals: AtomicUsize::new(0),
            }),
        }
    }

    /// Sandbox that answers every request with `body`.
    pub fn responding(body: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Respond(body.into()))
    }

    /// Sandbox whose boot always fails.
    pub fn failing_boot(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::FailBoot(message.into()))
    }

    /// Sandbox that boots but fails every dispatch.
    pub fn failing_dispatch(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::FailDispatch(message.into()))
    }

    /// Change the response body for subsequent requests.
    pub fn set_response(&self, body: impl Into<String>) {
        *self.state.behavior.write().unwrap() = Behavior::Respond(body.into());
    }

    /// Get all boots.
    pub fn boots(&self) -> Vec<BootRecord> {
        self.state.boots.read().unwrap().clone()
    }

    /// Number of boots.
    pub fn boot_count(&self) -> usize {
        self.state.boots.read().unwrap().len()
    }

    /// Get all dispatched requests, in order.
    pub fn dispatched_requests(&self) -> Vec<String> {
        self.state.requests.read().unwrap().clone()
    }

    /// Number of disposals.
    pub fn disposal_count(&self) -> usize {
        self.state.disposals.load(Ordering::SeqCst)
    }

    /// Assert that no sandbox was booted.
    pub fn assert_not_booted(&self) {
        let boots = self.state.boots.read().unwrap();
        assert!(
            boots.is_empty(),
            "Expected no sandbox boot, but {} occurred",
            boots.len()
        );
    }

    /// Assert that a request was dispatched.
    pub fn assert_dispatched(&self, request: &str) {
        let requests = self.state.requests.read().unwrap();
        assert!(
            requests.iter().any(|r| r == request),
            "Expected request '{}' to be dispatched. Dispatched requests: {:?}",
            request,
            *requests
        );
    }

    /// Assert that every booted instance was disposed exactly once.
    pub fn assert_disposed_once(&self) {
        let boots = self.boot_count();
        let disposals = self.disposal_count();
        assert!(boots > 0, "Expected a sandbox boot, but none occurred");
        assert_eq!(
            boots, disposals,
            "Expected {} disposal(s), got {}",
            boots, disposals
        );
    }
}

impl SandboxRuntime for MockSandbox {
    type Instance = MockInstance;

    fn boot(
        &self,
        program: DescriptorProgram,
        profile: &DescriptorProfile,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Instance>> + Send + '_>> {
        let profile = *profile;
        Box::pin(async move {
            if let Behavior::FailBoot(message) = &*self.state.behavior.read().unwrap() {
                return Err(TypesError::RuntimeBoot(message.clone()));
            }

            self.state.boots.write().unwrap().push(BootRecord {
                program_source: program.source,
                profile,
            });

            Ok(MockInstance {
                state: self.state.clone(),
            })
        })
    }
}

/// Instance handed out by [`MockSandbox`].
pub struct MockInstance {
    state: Arc<MockState>,
}

impl SandboxInstance for MockInstance {
    fn dispatch(
        &self,
        request: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let request = request.to_string();
        Box::pin(async move {
            self.state.requests.write().unwrap().push(request);

            match &*self.state.behavior.read().unwrap() {
                Behavior::Respond(body) => Ok(body.clone()),
                Behavior::FailDispatch(message) => Err(TypesError::Dispatch(message.clone())),
                Behavior::FailBoot(message) => Err(TypesError::Dispatch(message.clone())),
            }
        })
    }

    fn dispose(self) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        Box::pin(async move {
            self.state.disposals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::DESCRIPTOR_PROFILE;

    fn program() -> DescriptorProgram {
        DescriptorProgram::new("worker.mjs", "export default {}")
    }

    #[tokio::test]
    async fn test_mock_records_round_trip() {
        let sandbox = MockSandbox::responding("declare const X: string;");

        let instance = sandbox.boot(program(), &DESCRIPTOR_PROFILE).await.unwrap();
        let body = instance
            .dispatch("http://dummy.com/2024-01-01")
            .await
            .unwrap();
        instance.dispose().await.unwrap();

        assert_eq!(body, "declare const X: string;");
        assert_eq!(sandbox.boots()[0].program_source, "export default {}");
        sandbox.assert_dispatched("http://dummy.com/2024-01-01");
        sandbox.assert_disposed_once();
    }

    #[tokio::test]
    async fn test_mock_boot_failure() {
        let sandbox = MockSandbox::failing_boot("no workerd");

        let result = sandbox.boot(program(), &DESCRIPTOR_PROFILE).await;
        assert!(matches!(result, Err(TypesError::RuntimeBoot(_))));
        sandbox.assert_not_booted();
    }

    #[tokio::test]
    async fn test_mock_dispatch_failure() {
        let sandbox = MockSandbox::failing_dispatch("crashed");

        let instance = sandbox.boot(program(), &DESCRIPTOR_PROFILE).await.unwrap();
        let result = instance.dispatch("http://dummy.com/2024-01-01").await;
        assert!(matches!(result, Err(TypesError::Dispatch(_))));
        assert_eq!(sandbox.dispatched_requests().len(), 1);
    }
}
