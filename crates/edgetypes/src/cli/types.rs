use anyhow::{bail, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use edgetypes::{ProjectConfig, DEFAULT_CONFIG_FILE};

/// Generate runtime type declarations.
#[derive(Parser)]
pub struct TypesCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Output file (defaults to .edgetypes/types/runtime.d.ts next to the config).
    #[arg(short, long)]
    pub out_file: Option<PathBuf>,

    /// Compatibility date (overrides config).
    #[arg(long)]
    pub compatibility_date: Option<String>,

    /// Compatibility flag (overrides config, repeatable).
    #[arg(long = "compatibility-flag")]
    pub compatibility_flags: Vec<String>,

    /// workerd executable (overrides config).
    #[arg(long)]
    pub workerd: Option<String>,
}

impl TypesCommand {
    /// Execute the types command.
    pub async fn execute(self) -> Result<()> {
        let project = self.load_project()?;

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Generating runtime types...");

        let result = edgetypes::generate_runtime_types(&project, self.out_file.as_deref()).await;
        pb.finish_and_clear();
        let written = result?;

        println!(
            "  {} Generated runtime types for {}",
            style("✓").green(),
            compatibility_label(&project)
        );
        println!(
            "  {} Output: {}",
            style("📁").dim(),
            style(written.display()).cyan()
        );

        Ok(())
    }

    fn load_project(&self) -> Result<ProjectConfig> {
        let config_path = Path::new(&self.config);

        let project = if config_path.exists() {
            info!("Loading configuration from {}", self.config);
            let mut project = ProjectConfig::from_file(config_path)?;
            project.config_path = Some(std::fs::canonicalize(config_path)?);
            project
        } else if self.compatibility_date.is_some() {
            ProjectConfig::default()
        } else {
            bail!(
                "Configuration file not found: {}\nPass --compatibility-date or create the file.",
                self.config
            );
        };

        Ok(self.apply_overrides(project))
    }

    fn apply_overrides(&self, mut project: ProjectConfig) -> ProjectConfig {
        if let Some(date) = &self.compatibility_date {
            project.compatibility_date = Some(date.clone());
        }
        if !self.compatibility_flags.is_empty() {
            project.compatibility_flags = self.compatibility_flags.clone();
        }
        if let Some(binary) = &self.workerd {
            project.runtime.binary = binary.clone();
        }
        project
    }
}

/// Summary of the compatibility settings a successful run used.
///
/// Reads the fields directly; generation has already validated them.
fn compatibility_label(project: &ProjectConfig) -> String {
    let date = project.compatibility_date.as_deref().unwrap_or_default();
    if project.compatibility_flags.is_empty() {
        style(date).cyan().to_string()
    } else {
        format!(
            "{} ({})",
            style(date).cyan(),
            project.compatibility_flags.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(config: &str) -> TypesCommand {
        TypesCommand {
            config: config.to_string(),
            out_file: None,
            compatibility_date: None,
            compatibility_flags: Vec::new(),
            workerd: None,
        }
    }

    #[test]
    fn test_types_command_defaults() {
        let cmd = TypesCommand::try_parse_from(["types"]).unwrap();
        assert_eq!(cmd.config, DEFAULT_CONFIG_FILE);
        assert!(cmd.out_file.is_none());
        assert!(cmd.compatibility_flags.is_empty());
    }

    #[test]
    fn test_types_command_repeated_flags() {
        let cmd = TypesCommand::try_parse_from([
            "types",
            "--compatibility-date",
            "2023-07-24",
            "--compatibility-flag",
            "nodejs_compat",
            "--compatibility-flag",
            "experimental",
            "--out-file",
            "/tmp/out.d.ts",
        ])
        .unwrap();
        assert_eq!(cmd.compatibility_date.as_deref(), Some("2023-07-24"));
        assert_eq!(cmd.compatibility_flags, vec!["nodejs_compat", "experimental"]);
        assert_eq!(cmd.out_file, Some(PathBuf::from("/tmp/out.d.ts")));
    }

    #[test]
    fn test_load_project_from_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("edgetypes.toml");
        std::fs::write(
            &config_path,
            "compatibility_date = \"2022-01-01\"\ncompatibility_flags = [\"a\"]\n",
        )
        .unwrap();

        let mut cmd = command(config_path.to_str().unwrap());
        cmd.compatibility_date = Some("2024-01-01".to_string());
        cmd.workerd = Some("/opt/workerd".to_string());

        let project = cmd.load_project().unwrap();
        assert_eq!(project.compatibility_date.as_deref(), Some("2024-01-01"));
        assert_eq!(project.compatibility_flags, vec!["a"]);
        assert_eq!(project.runtime.binary, "/opt/workerd");
        assert!(project.config_path.unwrap().is_absolute());
    }

    #[test]
    fn test_load_project_without_file_needs_date() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");

        let cmd = command(missing.to_str().unwrap());
        assert!(cmd.load_project().is_err());

        let mut cmd = command(missing.to_str().unwrap());
        cmd.compatibility_date = Some("2024-01-01".to_string());
        let project = cmd.load_project().unwrap();
        assert!(project.config_path.is_none());
        assert_eq!(project.compatibility_date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_compatibility_label_uses_raw_fields() {
        console::set_colors_enabled(false);

        let mut project = ProjectConfig {
            compatibility_date: Some("2023-07-24".to_string()),
            ..Default::default()
        };
        assert_eq!(compatibility_label(&project), "2023-07-24");

        project.compatibility_flags =
            vec!["nodejs_compat".to_string(), "experimental".to_string()];
        assert_eq!(
            compatibility_label(&project),
            "2023-07-24 (nodejs_compat, experimental)"
        );

        // Formatting never re-validates the date.
        project.compatibility_date = Some("not-a-date".to_string());
        project.compatibility_flags.clear();
        assert_eq!(compatibility_label(&project), "not-a-date");
    }
}
