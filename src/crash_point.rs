//! Crash point injection for testing the atomic commit
//!
//! When `JSONDB_CRASH_POINT` names a point the engine reaches, the process
//! terminates immediately via `std::process::abort()`: no cleanup, no
//! unwinding, no catching. Tests drive this by spawning the `jsondb` binary
//! and inspecting the directory it leaves behind.
//!
//! ```bash
//! JSONDB_CRASH_POINT=write_before_rename jsondb --dir ./db write users john '{}'
//! ```

use std::sync::OnceLock;

/// Environment variable that arms a crash point
pub const CRASH_POINT_ENV: &str = "JSONDB_CRASH_POINT";

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn configured() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var(CRASH_POINT_ENV).ok())
        .as_deref()
}

/// Returns true if `JSONDB_CRASH_POINT` equals `name`
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    configured() == Some(name)
}

/// Aborts the process if the named crash point is armed
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    /// Collection directory exists, nothing written yet
    pub const WRITE_BEFORE_TEMP: &str = "write_before_temp";
    /// Temp file complete, final file untouched
    pub const WRITE_BEFORE_RENAME: &str = "write_before_rename";
    /// Rename done, lock still held
    pub const WRITE_AFTER_RENAME: &str = "write_after_rename";
    /// Target located under the lock, nothing removed yet
    pub const DELETE_BEFORE_REMOVE: &str = "delete_before_remove";

    pub fn all() -> &'static [&'static str] {
        &[
            WRITE_BEFORE_TEMP,
            WRITE_BEFORE_RENAME,
            WRITE_AFTER_RENAME,
            DELETE_BEFORE_REMOVE,
        ]
    }
}
