//! Path resolution for collections and resources
//!
//! Layout on disk:
//!
//! ```text
//! <root>/
//!   <collection>/
//!     <resource>.json         final committed document
//!     <resource>.json.tmp     present only mid-write or after a crash
//! ```
//!
//! Every read-side lookup goes through [`locate`], which treats a bare name
//! and its `.json`-suffixed form as equivalent.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};

/// Suffix of a committed document
pub const JSON_SUFFIX: &str = ".json";

/// Suffix appended to the final path while a write is in flight
pub const TEMP_SUFFIX: &str = ".tmp";

/// What a probe matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A whole collection (or any other directory)
    Directory,
    /// A single document
    File,
}

/// Result of a successful [`locate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// The path that actually exists, either the probed path or its `.json` form
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl Located {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Checks that `value` can be used as a single path segment.
///
/// Runs before any lock is taken or any file is touched.
pub fn validate_name(field: &str, value: &str) -> StorageResult<()> {
    if value.is_empty() {
        return Err(StorageError::validation(field, "must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(StorageError::validation(
            field,
            format!("'{}' is not a valid name", value),
        ));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(StorageError::validation(
            field,
            format!("'{}' must not contain path separators", value),
        ));
    }
    Ok(())
}

/// Appends `.json` to `path` without touching any existing extension
pub fn with_json_suffix(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(JSON_SUFFIX);
    PathBuf::from(raw)
}

/// Sibling temp file used by the atomic commit: `<final>.tmp`
pub fn temp_path_for(final_path: &Path) -> PathBuf {
    let mut raw = final_path.as_os_str().to_os_string();
    raw.push(TEMP_SUFFIX);
    PathBuf::from(raw)
}

/// Probes `path`, then `path.json`.
///
/// Returns whichever exists (the exact path wins), or NotFound naming the
/// original path if neither does. Errors other than "does not exist" on the
/// first probe are surfaced as I/O errors rather than masked by the second.
pub fn locate(path: &Path) -> StorageResult<Located> {
    if let Some(kind) = probe(path)? {
        return Ok(Located {
            path: path.to_path_buf(),
            kind,
        });
    }

    let suffixed = with_json_suffix(path);
    if let Some(kind) = probe(&suffixed)? {
        return Ok(Located {
            path: suffixed,
            kind,
        });
    }

    Err(StorageError::not_found(path))
}

fn probe(path: &Path) -> StorageResult<Option<EntryKind>> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
        Ok(_) => Ok(Some(EntryKind::File)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::io_error("failed to stat path", path, e)),
    }
}
