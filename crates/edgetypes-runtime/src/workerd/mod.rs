//! Process-backed sandbox running the type descriptor program in workerd.

mod capnp;
mod process;

pub use capnp::{render_config, SERVICE_NAME};

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::time::Duration;

use edgetypes_core::{
    DescriptorProfile, DescriptorProgram, Result, RuntimeConfig, SandboxInstance, SandboxRuntime,
    TypesError,
};
use reqwest::header::HOST;
use tempfile::TempDir;
use tokio::process::Child;
use tracing::{debug, info, warn};

use process::{reserve_loopback_address, spawn_workerd, wait_ready};

const CONFIG_FILE_NAME: &str = "config.capnp";

/// Boots workerd processes.
#[derive(Debug, Clone)]
pub struct WorkerdRuntime {
    binary: String,
    boot_timeout: Duration,
    dispatch_timeout: Duration,
}

impl WorkerdRuntime {
    /// Create a runtime launching `binary` with default timeouts.
    pub fn new(binary: impl Into<String>) -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            binary: binary.into(),
            boot_timeout: defaults.boot_timeout(),
            dispatch_timeout: defaults.dispatch_timeout(),
        }
    }

    /// Create a runtime from project runtime settings.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            boot_timeout: config.boot_timeout(),
            dispatch_timeout: config.dispatch_timeout(),
        }
    }

    /// Set the boot timeout.
    pub fn with_boot_timeout(mut self, timeout: Duration) -> Self {
        self.boot_timeout = timeout;
        self
    }

    async fn boot_instance(
        &self,
        program: DescriptorProgram,
        profile: DescriptorProfile,
    ) -> Result<WorkerdInstance> {
        let workdir = tempfile::Builder::new()
            .prefix("edgetypes-")
            .tempdir()
            .map_err(|e| boot_error("create sandbox directory", e))?;

        let module_name = program.module_name().to_string();
        tokio::fs::write(workdir.path().join(&module_name), &program.source)
            .await
            .map_err(|e| boot_error("stage descriptor program", e))?;

        let address = reserve_loopback_address()?;
        let config_file = workdir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&config_file, render_config(&module_name, address, &profile))
            .await
            .map_err(|e| boot_error("write workerd config", e))?;

        let mut child = spawn_workerd(&self.binary, &config_file, workdir.path())?;
        debug!(pid = ?child.id(), %address, "Spawned workerd");

        if let Err(e) = wait_ready(&mut child, address, self.boot_timeout).await {
            if let Err(kill_err) = child.kill().await {
                warn!(error = %kill_err, "Failed to kill workerd after boot failure");
            }
            return Err(e);
        }

        let client = sandbox_client(self.dispatch_timeout)?;

        info!(%address, "Type descriptor sandbox ready");

        Ok(WorkerdInstance {
            child,
            address,
            client,
            workdir,
        })
    }
}

impl SandboxRuntime for WorkerdRuntime {
    type Instance = WorkerdInstance;

    fn boot(
        &self,
        program: DescriptorProgram,
        profile: &DescriptorProfile,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Instance>> + Send + '_>> {
        let profile = *profile;
        Box::pin(self.boot_instance(program, profile))
    }
}

/// A running workerd process serving the descriptor program.
///
/// Dropping the instance without disposing still kills the process.
pub struct WorkerdInstance {
    child: Child,
    address: SocketAddr,
    client: reqwest::Client,
    workdir: TempDir,
}

impl WorkerdInstance {
    /// Loopback address the instance listens on.
    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

impl SandboxInstance for WorkerdInstance {
    fn dispatch(
        &self,
        request: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(send_request(
            self.client.clone(),
            self.address,
            request.to_string(),
        ))
    }

    fn dispose(self) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        Box::pin(async move {
            let WorkerdInstance {
                mut child, workdir, ..
            } = self;

            if child.try_wait()?.is_none() {
                child.kill().await?;
            }
            workdir.close()?;

            debug!("Type descriptor sandbox disposed");
            Ok(())
        })
    }
}

/// HTTP client for talking to a sandbox on loopback.
///
/// System proxy settings are ignored; a proxy cannot reach the loopback
/// socket.
fn sandbox_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(timeout)
        .build()
        .map_err(|e| boot_error("build HTTP client", e))
}

async fn send_request(
    client: reqwest::Client,
    address: SocketAddr,
    request: String,
) -> Result<String> {
    let (authority, path) = split_request(&request)?;
    let url = format!("http://{}{}", address, path);

    debug!(%request, %url, "Dispatching descriptor request");

    let response = client
        .get(&url)
        .header(HOST, authority)
        .send()
        .await
        .map_err(|e| TypesError::Dispatch(format!("Request to sandbox failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TypesError::Dispatch(format!("Failed to read sandbox response: {}", e)))?;

    if !status.is_success() {
        return Err(TypesError::Dispatch(format!(
            "Type descriptor returned {}: {}",
            status, body
        )));
    }

    Ok(body)
}

/// Split `scheme://authority/path` into authority and path.
///
/// The path is kept byte for byte; the descriptor program parses it itself.
fn split_request(request: &str) -> Result<(&str, &str)> {
    let rest = request
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or_else(|| TypesError::Dispatch(format!("Invalid request URL '{}'", request)))?;

    match rest.find('/') {
        Some(idx) => Ok((&rest[..idx], &rest[idx..])),
        None => Ok((rest, "/")),
    }
}

fn boot_error(action: &str, e: impl std::fmt::Display) -> TypesError {
    TypesError::RuntimeBoot(format!("Failed to {}: {}", action, e))
}
