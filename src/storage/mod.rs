//! Document storage subsystem
//!
//! Records live as individual JSON files under a root directory, grouped
//! into collections (subdirectories).
//!
//! # Invariants
//!
//! - A committed document is always complete, valid JSON: writes go to a
//!   temp file and are renamed into place
//! - Writes and deletes on the same collection are strictly serialized;
//!   different collections never block each other
//! - Empty or malformed names fail before any lock is taken or file touched

mod driver;
mod errors;
mod locks;
mod path;

pub use driver::{encode_document, Driver, Options};
pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use locks::{CollectionLock, CollectionLocks};
pub use path::{locate, validate_name, EntryKind, Located, JSON_SUFFIX, TEMP_SUFFIX};
