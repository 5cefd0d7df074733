//! Filesystem persistence for generated declarations.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use edgetypes_core::{Result, TypesError};
use tempfile::NamedTempFile;

/// Mode for a declaration file written where none existed.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Create the parent directory of `path`, including intermediate directories.
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    match parent_dir(path) {
        Some(parent) => {
            tokio::fs::create_dir_all(parent).await?;
            Ok(())
        }
        None => Ok(()),
    }
}

/// Replace `path` with `contents` atomically.
///
/// The text is written to a temporary file in the same directory, synced, and
/// renamed over the destination. On failure the destination is untouched.
/// An existing destination keeps its permissions; a new file is world-readable.
pub async fn write_atomic(path: PathBuf, contents: String) -> Result<()> {
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, contents.as_bytes()))
        .await
        .map_err(|e| TypesError::Io(std::io::Error::other(e)))?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = parent_dir(path).unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    match std::fs::metadata(path) {
        Ok(existing) if existing.is_file() => {
            temp.as_file().set_permissions(existing.permissions())?
        }
        _ => set_new_file_permissions(temp.as_file())?,
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| TypesError::Io(e.error))?;

    Ok(())
}

#[cfg(unix)]
fn set_new_file_permissions(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn set_new_file_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/c/runtime.d.ts");

        ensure_parent_dir(&path).await.unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_bare_file_name() {
        ensure_parent_dir(Path::new("runtime.d.ts")).await.unwrap();
    }

    #[tokio::test]
    async fn test_write_atomic_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime.d.ts");
        std::fs::write(&path, "old content that is longer than the new one").unwrap();

        write_atomic(path.clone(), "new".to_string()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime.d.ts");

        write_atomic(path.clone(), "declare const X: string;".to_string())
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_write_atomic_failure_keeps_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime.d.ts");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "kept").unwrap();

        let err = write_atomic(path.clone(), "text".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, TypesError::Io(_)));
        assert_eq!(std::fs::read_to_string(path.join("keep")).unwrap(), "kept");
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_atomic_new_file_is_readable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime.d.ts");

        write_atomic(path.clone(), "declare const X: string;".to_string())
            .await
            .unwrap();
        assert_eq!(mode_of(&path), NEW_FILE_MODE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_atomic_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime.d.ts");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(path.clone(), "new".to_string()).await.unwrap();
        assert_eq!(mode_of(&path), 0o640);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
