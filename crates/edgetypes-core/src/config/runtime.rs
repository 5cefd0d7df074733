use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Bundled type descriptor program, relative to the project root.
pub const DESCRIPTOR_PROGRAM_PATH: &str = "node_modules/workerd/worker.mjs";

/// Sandbox runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// workerd executable to launch.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Type descriptor program loaded into the sandbox.
    #[serde(default = "default_descriptor_program")]
    pub descriptor_program: PathBuf,

    /// How long to wait for the sandbox to accept connections.
    #[serde(default = "default_boot_timeout")]
    pub boot_timeout_secs: u64,

    /// How long to wait for the descriptor response.
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            descriptor_program: default_descriptor_program(),
            boot_timeout_secs: default_boot_timeout(),
            dispatch_timeout_secs: default_dispatch_timeout(),
        }
    }
}

impl RuntimeConfig {
    /// Boot timeout as a Duration.
    pub fn boot_timeout(&self) -> Duration {
        Duration::from_secs(self.boot_timeout_secs)
    }

    /// Dispatch timeout as a Duration.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}

fn default_binary() -> String {
    "workerd".to_string()
}

fn default_descriptor_program() -> PathBuf {
    PathBuf::from(DESCRIPTOR_PROGRAM_PATH)
}

fn default_boot_timeout() -> u64 {
    10
}

fn default_dispatch_timeout() -> u64 {
    30
}
