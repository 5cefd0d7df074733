mod runtime;

pub use runtime::{RuntimeConfig, DESCRIPTOR_PROGRAM_PATH};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compat::CompatibilityConfig;
use crate::error::{Result, TypesError};

/// Default project configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "edgetypes.toml";

/// Project configuration for runtime type generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name.
    #[serde(default)]
    pub name: Option<String>,

    /// Compatibility date the project targets.
    #[serde(default)]
    pub compatibility_date: Option<String>,

    /// Compatibility flags the project enables, in declaration order.
    #[serde(default)]
    pub compatibility_flags: Vec<String>,

    /// Sandbox runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Path of the file this configuration was loaded from.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TypesError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::parse_toml(&content)?;
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            compatibility_date = ?config.compatibility_date,
            flags = config.compatibility_flags.len(),
            "Loaded project config"
        );
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        toml::from_str(&content)
            .map_err(|e| TypesError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate and extract the compatibility configuration.
    ///
    /// This is the only place the compatibility date is checked; the
    /// low-level generator trusts what it receives.
    pub fn compatibility(&self) -> Result<CompatibilityConfig> {
        let date = self
            .compatibility_date
            .as_deref()
            .ok_or_else(|| TypesError::Config("Config must have a compatibility date".into()))?;

        CompatibilityConfig::new(date, self.compatibility_flags.clone())
    }

    /// Directory containing the config file, if it was loaded from disk.
    pub fn root_dir(&self) -> Option<&Path> {
        self.config_path.as_deref().and_then(Path::parent)
    }

    /// Absolute or root-relative path of the descriptor program.
    pub fn descriptor_program_path(&self) -> PathBuf {
        let program = &self.runtime.descriptor_program;
        if program.is_absolute() {
            return program.clone();
        }
        match self.root_dir() {
            Some(root) => root.join(program),
            None => program.clone(),
        }
    }
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
        Ok(re) => re,
        Err(_) => return result,
    };

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}
