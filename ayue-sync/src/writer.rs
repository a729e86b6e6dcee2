//! Hash-gated atomic copy.
//!
//! ## `copy_file` protocol
//!
//! 1. Read the source bytes.
//! 2. SHA-256 hash them.
//! 3. Hash the current destination, if any → skip if identical.
//! 4. Write to `<dest>.ayue.tmp`.
//! 5. Rename to the final path (atomic on POSIX).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; destination already holds identical bytes.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::Unchanged { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// copy_file
// ---------------------------------------------------------------------------

/// Copy `source` to `dest`, creating parent directories, unless `dest`
/// already has the same content.
pub fn copy_file(source: &Path, dest: &Path) -> Result<WriteResult, SyncError> {
    let bytes = std::fs::read(source).map_err(|e| io_err(source, e))?;
    let tmp = PathBuf::from(format!("{}.ayue.tmp", dest.display()));
    copy_bytes_with_tmp(&bytes, dest, &tmp)
}

fn copy_bytes_with_tmp(bytes: &[u8], dest: &Path, tmp: &Path) -> Result<WriteResult, SyncError> {
    let digest = sha256_hex(bytes);

    match std::fs::read(dest) {
        Ok(existing) if sha256_hex(&existing) == digest => {
            tracing::debug!("unchanged: {}", dest.display());
            return Ok(WriteResult::Unchanged {
                path: dest.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(io_err(dest, err)),
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, bytes).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, dest) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(dest, e));
    }

    tracing::info!("wrote: {}", dest.display());
    Ok(WriteResult::Written {
        path: dest.to_path_buf(),
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn source(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("src.js");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn first_copy_returns_written() {
        let tmp = TempDir::new().unwrap();
        let src = source(&tmp, "a");
        let dest = tmp.path().join("out").join("a.js");
        let result = copy_file(&src, &dest).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "a");
    }

    #[test]
    fn second_copy_same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let src = source(&tmp, "same");
        let dest = tmp.path().join("dest.js");
        copy_file(&src, &dest).unwrap();
        let result = copy_file(&src, &dest).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn changed_content_returns_written() {
        let tmp = TempDir::new().unwrap();
        let src = source(&tmp, "v1");
        let dest = tmp.path().join("dest.js");
        copy_file(&src, &dest).unwrap();
        fs::write(&src, "v2").unwrap();
        let result = copy_file(&src, &dest).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "v2");
    }

    #[test]
    fn tmp_file_removed_after_copy() {
        let tmp = TempDir::new().unwrap();
        let src = source(&tmp, "data");
        let dest = tmp.path().join("clean.js");
        copy_file(&src, &dest).unwrap();
        let tmp_path = PathBuf::from(format!("{}.ayue.tmp", dest.display()));
        assert!(!tmp_path.exists(), ".ayue.tmp must be cleaned up");
    }

    #[test]
    fn missing_source_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = copy_file(&tmp.path().join("nope"), &tmp.path().join("x")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let dest = readonly_dir.join("file.js");
        fs::write(&dest, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("file.js.ayue.tmp");

        let result = copy_bytes_with_tmp(b"new content", &dest, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root bypasses the read-only bit; only assert when it held.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&dest).unwrap(), "original");
            assert!(!tmp_path.exists(), ".ayue.tmp should be cleaned up");
        }
    }
}
