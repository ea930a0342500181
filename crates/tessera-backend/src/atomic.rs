//! Atomic write primitive
//!
//! Uses the temp→rename pattern so a key never exposes partial bytes.

use std::fs;
use std::path::Path;

use tessera_errors::{io_error, Result};

/// Atomically write bytes to a file
pub(crate) fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| io_error("create_shard_dir", parent.display().to_string(), e))?;
    }

    let temp_path = target_path.with_extension("tmp");

    fs::write(&temp_path, content)
        .map_err(|e| io_error("write_temp", temp_path.display().to_string(), e))?;

    fs::rename(&temp_path, target_path)
        .map_err(|e| io_error("rename_temp", target_path.display().to_string(), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("blob");

        atomic_write(&target, b"hello").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"hello");
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("ab").join("blob");

        atomic_write(&target, b"nested").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"nested");
    }

    #[test]
    fn test_no_tmp_files_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("blob");

        atomic_write(&target, b"clean").unwrap();

        let tmp_count = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|s| s.ends_with(".tmp"))
                    .unwrap_or(false)
            })
            .count();

        assert_eq!(tmp_count, 0);
    }
}
