//! workerd process spawning and readiness.

use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use edgetypes_core::{Result, TypesError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};

/// Interval between readiness checks.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Reserve a free loopback address for the sandbox socket.
///
/// The port is released before workerd binds it, so another process could
/// claim it in between; workerd then fails to start and boot reports it.
pub fn reserve_loopback_address() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|e| {
        TypesError::RuntimeBoot(format!("Failed to reserve a loopback port: {}", e))
    })?;
    listener
        .local_addr()
        .map_err(|e| TypesError::RuntimeBoot(format!("Failed to read reserved port: {}", e)))
}

/// Spawn `workerd serve <config> --experimental` in `cwd`.
pub fn spawn_workerd(binary: &str, config_file: &Path, cwd: &Path) -> Result<Child> {
    let mut cmd = Command::new(binary);

    cmd.arg("serve")
        .arg(config_file)
        .arg("--experimental")
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| TypesError::RuntimeBoot(format!("Failed to spawn {}: {}", binary, e)))?;

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "edgetypes::workerd", "{}", line);
            }
        });
    }

    Ok(child)
}

/// Wait until `address` accepts connections.
///
/// Fails if the child exits first or `timeout` elapses.
pub async fn wait_ready(child: &mut Child, address: SocketAddr, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait().map_err(|e| {
            TypesError::RuntimeBoot(format!("Failed to poll workerd process: {}", e))
        })? {
            return Err(TypesError::RuntimeBoot(format!(
                "workerd exited before accepting connections ({})",
                status
            )));
        }

        if TcpStream::connect(address).await.is_ok() {
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(TypesError::RuntimeBoot(format!(
                "workerd did not listen on {} within {:?}",
                address, timeout
            )));
        }

        sleep(READY_POLL_INTERVAL).await;
    }
}
