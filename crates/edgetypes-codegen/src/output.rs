//! Output location for generated runtime types.

use std::path::{Path, PathBuf};

use edgetypes_core::{ProjectConfig, Result, TypesError};

/// Default location of the runtime declaration file, relative to the
/// directory holding the project config.
pub const DEFAULT_RUNTIME_TYPES_PATH: &str = ".edgetypes/types/runtime.d.ts";

/// Resolved destination of the declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget(PathBuf);

impl OutputTarget {
    /// Resolve the output path.
    ///
    /// An explicit `out_file` wins and is used verbatim. Otherwise the
    /// default path is joined onto the directory containing `root_path`.
    pub fn resolve(out_file: Option<&Path>, root_path: Option<&Path>) -> Result<Self> {
        if let Some(out_file) = out_file {
            return Ok(Self(out_file.to_path_buf()));
        }

        let root_path = root_path.ok_or_else(|| {
            TypesError::Config(
                "Insufficient information to determine output location: \
                 provide an output file or a project config path"
                    .to_string(),
            )
        })?;

        let root_dir = root_path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self(root_dir.join(DEFAULT_RUNTIME_TYPES_PATH)))
    }

    /// Resolve the output path for a loaded project.
    pub fn for_project(project: &ProjectConfig, out_file: Option<&Path>) -> Result<Self> {
        Self::resolve(out_file, project.config_path.as_deref())
    }

    /// The resolved path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Consume the target and return the path.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for OutputTarget {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_out_file_wins() {
        let target = OutputTarget::resolve(
            Some(Path::new("/tmp/out.d.ts")),
            Some(Path::new("/work/app/edgetypes.toml")),
        )
        .unwrap();
        assert_eq!(target.path(), Path::new("/tmp/out.d.ts"));
    }

    #[test]
    fn test_explicit_out_file_used_verbatim() {
        let target = OutputTarget::resolve(Some(Path::new("types/../gen.d.ts")), None).unwrap();
        assert_eq!(target.path(), Path::new("types/../gen.d.ts"));
    }

    #[test]
    fn test_default_path_next_to_config() {
        let target =
            OutputTarget::resolve(None, Some(Path::new("/work/app/edgetypes.toml"))).unwrap();
        assert_eq!(
            target.path(),
            Path::new("/work/app/.edgetypes/types/runtime.d.ts")
        );
    }

    #[test]
    fn test_default_path_for_bare_config_name() {
        let target = OutputTarget::resolve(None, Some(Path::new("edgetypes.toml"))).unwrap();
        assert_eq!(target.path(), Path::new(".edgetypes/types/runtime.d.ts"));
    }

    #[test]
    fn test_missing_location_is_config_error() {
        let err = OutputTarget::resolve(None, None).unwrap_err();
        assert!(matches!(err, TypesError::Config(_)));
    }

    #[test]
    fn test_for_project_uses_config_path() {
        let project = ProjectConfig {
            config_path: Some(PathBuf::from("/srv/worker/edgetypes.toml")),
            ..Default::default()
        };
        let target = OutputTarget::for_project(&project, None).unwrap();
        assert_eq!(
            target.into_path_buf(),
            PathBuf::from("/srv/worker/.edgetypes/types/runtime.d.ts")
        );

        let err = OutputTarget::for_project(&ProjectConfig::default(), None).unwrap_err();
        assert!(matches!(err, TypesError::Config(_)));
    }
}
