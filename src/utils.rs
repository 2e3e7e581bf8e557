//! Shared helpers for locating the database file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::DATABASE_VAR;

/// Gets the database path.
///
/// `NOTES_DB` wins when set and non-blank. Otherwise the path is
/// `{data_dir}/notesearch/notes.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_database_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(DATABASE_VAR).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("notesearch").join("notes.db"))
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn get_database_path_defaults_to_data_dir() {
        unsafe { std::env::remove_var(DATABASE_VAR) };

        let path = get_database_path().expect("data dir should resolve");
        assert!(path.to_string_lossy().contains("notesearch"));
        assert!(path.ends_with("notes.db"));
    }

    #[test]
    #[serial]
    fn get_database_path_honors_override() {
        unsafe { std::env::set_var(DATABASE_VAR, "/tmp/custom/notes.db") };
        let path = get_database_path().unwrap();
        unsafe { std::env::remove_var(DATABASE_VAR) };

        assert_eq!(path, PathBuf::from("/tmp/custom/notes.db"));
    }

    #[test]
    fn ensure_database_directory_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("a").join("b").join("notes.db");

        ensure_database_directory(&db_path).unwrap();
        assert!(db_path.parent().unwrap().is_dir());

        ensure_database_directory(Path::new("notes.db")).unwrap();
    }
}
