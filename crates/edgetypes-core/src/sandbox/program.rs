use std::path::{Path, PathBuf};

use crate::error::{Result, TypesError};

/// Compatibility profile the descriptor program itself runs under.
///
/// Independent of the configuration being described; it only has to be
/// recent enough to run the descriptor program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorProfile {
    pub compatibility_date: &'static str,
    pub compatibility_flags: &'static [&'static str],
}

/// The fixed profile used for every descriptor sandbox.
pub const DESCRIPTOR_PROFILE: DescriptorProfile = DescriptorProfile {
    compatibility_date: "2024-01-01",
    compatibility_flags: &["nodejs_compat", "rtti_api"],
};

/// The type descriptor program, loaded into memory.
#[derive(Debug, Clone)]
pub struct DescriptorProgram {
    /// Where the program was loaded from.
    pub path: PathBuf,
    /// ES module source.
    pub source: String,
}

impl DescriptorProgram {
    /// Create a program from in-memory source.
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Load the program from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            TypesError::RuntimeBoot(format!(
                "Failed to read type descriptor program {}: {}",
                path.display(),
                e
            ))
        })?;

        let source = String::from_utf8(bytes).map_err(|_| {
            TypesError::RuntimeBoot(format!(
                "Type descriptor program {} is not valid UTF-8",
                path.display()
            ))
        })?;

        if source.trim().is_empty() {
            return Err(TypesError::RuntimeBoot(format!(
                "Type descriptor program {} is empty",
                path.display()
            )));
        }

        Ok(Self::new(path, source))
    }

    /// Module name the program is registered under.
    pub fn module_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("worker.mjs")
    }
}
