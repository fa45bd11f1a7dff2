//! Observable storage engine events
//!
//! Every diagnostic the engine emits uses one of these names, so log
//! consumers can match on a closed set.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Bootstrap
    /// Root directory already existed
    DatabaseOpened,
    /// Root directory was created
    DatabaseCreated,

    // Write path
    /// Collection directory created on first write
    CollectionCreated,
    /// Temp file fully written, about to rename
    WriteStaged,
    /// Rename completed, document visible
    WriteCommitted,
    /// Any step of the write path failed
    WriteFailed,

    // Read path
    /// Single document read and decoded
    ReadComplete,
    /// Collection listed and every entry read
    ReadAllComplete,
    /// Read or ReadAll failed
    ReadFailed,

    // Delete path
    /// Single document removed
    ResourceDeleted,
    /// Whole directory removed
    CollectionDeleted,
    /// Delete failed
    DeleteFailed,
}

impl Event {
    /// Returns the event name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::DatabaseOpened => "DATABASE_OPENED",
            Event::DatabaseCreated => "DATABASE_CREATED",
            Event::CollectionCreated => "COLLECTION_CREATED",
            Event::WriteStaged => "WRITE_STAGED",
            Event::WriteCommitted => "WRITE_COMMITTED",
            Event::WriteFailed => "WRITE_FAILED",
            Event::ReadComplete => "READ_COMPLETE",
            Event::ReadAllComplete => "READ_ALL_COMPLETE",
            Event::ReadFailed => "READ_FAILED",
            Event::ResourceDeleted => "RESOURCE_DELETED",
            Event::CollectionDeleted => "COLLECTION_DELETED",
            Event::DeleteFailed => "DELETE_FAILED",
        }
    }

    /// Whether this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::WriteFailed | Event::ReadFailed | Event::DeleteFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let all = [
            Event::DatabaseOpened,
            Event::DatabaseCreated,
            Event::CollectionCreated,
            Event::WriteStaged,
            Event::WriteCommitted,
            Event::WriteFailed,
            Event::ReadComplete,
            Event::ReadAllComplete,
            Event::ReadFailed,
            Event::ResourceDeleted,
            Event::CollectionDeleted,
            Event::DeleteFailed,
        ];
        for event in all {
            assert!(event
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::WriteFailed.is_failure());
        assert!(!Event::WriteCommitted.is_failure());
    }
}
