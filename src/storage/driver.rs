//! The storage engine facade
//!
//! A [`Driver`] is bound to one root directory for its lifetime. Each
//! collection is a subdirectory of the root and each resource a
//! `<resource>.json` file inside it.
//!
//! # Commit protocol
//!
//! 1. Take the collection lock (released on every exit path)
//! 2. Create the collection directory if missing
//! 3. Serialize with tab indentation plus one trailing newline
//! 4. Write the whole document to `<resource>.json.tmp` and fsync it
//! 5. Rename the temp file onto `<resource>.json`, then fsync the directory
//!
//! Readers never see a partial final file. A failed rename can leave the
//! `.tmp` file behind; the previous final file is untouched and the next
//! successful write to the same resource overwrites the stale temp file.
//!
//! Read and ReadAll take no lock.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::errors::{StorageError, StorageResult};
use super::locks::{self, CollectionLocks};
use super::path::{locate, temp_path_for, validate_name, with_json_suffix};
use crate::crash_point::{maybe_crash, points};
use crate::observability::{log_event, ConsoleLogger, Event, Logger, Severity};

/// Construction options for a [`Driver`]
#[derive(Clone, Default)]
pub struct Options {
    /// Diagnostics sink. `None` selects a console logger at INFO.
    pub logger: Option<Arc<dyn Logger>>,
}

impl Options {
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger: Some(logger),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("logger", &self.logger.as_ref().map(|_| "<dyn Logger>"))
            .finish()
    }
}

/// Embedded JSON document store bound to a root directory
pub struct Driver {
    dir: PathBuf,
    locks: CollectionLocks,
    log: Arc<dyn Logger>,
}

impl Driver {
    /// Binds a driver to `dir`, creating it recursively if it does not exist.
    ///
    /// Opening a directory that already exists is a no-op.
    pub fn new(dir: impl AsRef<Path>, options: Options) -> StorageResult<Self> {
        let dir = clean_path(dir.as_ref());
        let log = options
            .logger
            .unwrap_or_else(|| Arc::new(ConsoleLogger::new(Severity::Info)));

        let driver = Self {
            dir,
            locks: CollectionLocks::new(),
            log,
        };

        let dir_str = driver.dir.display().to_string();
        match fs::metadata(&driver.dir) {
            Ok(meta) if meta.is_dir() => {
                log_event(
                    driver.log.as_ref(),
                    Severity::Debug,
                    Event::DatabaseOpened,
                    &[("dir", dir_str.as_str()), ("version", crate::VERSION)],
                );
            }
            _ => {
                fs::create_dir_all(&driver.dir).map_err(|e| {
                    StorageError::io_error("failed to create database directory", &driver.dir, e)
                })?;
                log_event(
                    driver.log.as_ref(),
                    Severity::Debug,
                    Event::DatabaseCreated,
                    &[("dir", dir_str.as_str()), ("version", crate::VERSION)],
                );
            }
        }

        Ok(driver)
    }

    /// Root directory this driver owns
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of collections that have had a lock allocated
    pub fn tracked_collections(&self) -> usize {
        self.locks.len()
    }

    /// Persists `value` as `<collection>/<resource>.json`.
    ///
    /// Returns only after the rename has completed. Marshal, mkdir, temp
    /// write and rename failures are returned as-is.
    pub fn write<T>(&self, collection: &str, resource: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let lock = self.locks.lock_for(collection);
        let _guard = locks::acquire(&lock);

        let fields = [("collection", collection), ("resource", resource)];
        match self.commit(collection, resource, value) {
            Ok(final_path) => {
                let path = final_path.display().to_string();
                log_event(
                    self.log.as_ref(),
                    Severity::Debug,
                    Event::WriteCommitted,
                    &[fields[0], fields[1], ("path", path.as_str())],
                );
                Ok(())
            }
            Err(e) => {
                self.report(Event::WriteFailed, &e, &fields);
                Err(e)
            }
        }
    }

    fn commit<T>(&self, collection: &str, resource: &str, value: &T) -> StorageResult<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        let dir = self.dir.join(collection);
        let final_path = with_json_suffix(&dir.join(resource));
        let tmp_path = temp_path_for(&final_path);

        if !dir.is_dir() {
            fs::create_dir_all(&dir).map_err(|e| {
                StorageError::io_error("failed to create collection directory", &dir, e)
            })?;
            log_event(
                self.log.as_ref(),
                Severity::Debug,
                Event::CollectionCreated,
                &[("collection", collection)],
            );
        }

        let bytes = encode_document(value)?;

        maybe_crash(points::WRITE_BEFORE_TEMP);

        let mut file = File::create(&tmp_path)
            .map_err(|e| StorageError::io_error("failed to create temp file", &tmp_path, e))?;
        file.write_all(&bytes)
            .map_err(|e| StorageError::io_error("failed to write temp file", &tmp_path, e))?;
        file.sync_all()
            .map_err(|e| StorageError::io_error("failed to fsync temp file", &tmp_path, e))?;
        drop(file);

        if self.log.enabled(Severity::Trace) {
            let tmp = tmp_path.display().to_string();
            let len = bytes.len().to_string();
            log_event(
                self.log.as_ref(),
                Severity::Trace,
                Event::WriteStaged,
                &[("bytes", len.as_str()), ("tmp", tmp.as_str())],
            );
        }

        maybe_crash(points::WRITE_BEFORE_RENAME);

        fs::rename(&tmp_path, &final_path).map_err(|e| {
            StorageError::io_error("failed to rename temp file into place", &final_path, e)
        })?;

        // Directory fsync failure is ignored; the rename already happened
        if let Ok(handle) = File::open(&dir) {
            let _ = handle.sync_all();
        }

        maybe_crash(points::WRITE_AFTER_RENAME);

        Ok(final_path)
    }

    /// Reads `<collection>/<resource>` (bare or `.json`) and decodes it.
    ///
    /// Takes no lock. A concurrent write is observed either fully or not at all.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> StorageResult<T> {
        validate_name("collection", collection)?;
        validate_name("resource", resource)?;

        let fields = [("collection", collection), ("resource", resource)];
        let result = self.load(&self.dir.join(collection).join(resource));
        match &result {
            Ok(_) => log_event(
                self.log.as_ref(),
                Severity::Trace,
                Event::ReadComplete,
                &fields,
            ),
            Err(e) => self.report(Event::ReadFailed, e, &fields),
        }
        result
    }

    fn load<T: DeserializeOwned>(&self, record: &Path) -> StorageResult<T> {
        let located = locate(record)?;
        let bytes = fs::read(&located.path)
            .map_err(|e| StorageError::io_error("failed to read document", &located.path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::decode(&located.path, e))
    }

    /// Returns the raw content of every entry in the collection directory.
    ///
    /// Entries are not filtered and are returned sorted by file name. Any
    /// single read failure discards the whole result. Bytes that are not
    /// valid UTF-8 are replaced with U+FFFD rather than rejected.
    pub fn read_all(&self, collection: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .read_entries(collection)?
            .into_iter()
            .map(|(_, raw)| raw)
            .collect())
    }

    /// Decodes every entry of [`read_all`](Self::read_all) into `T`.
    ///
    /// A decode failure names the entry that failed.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> StorageResult<Vec<T>> {
        self.read_entries(collection)?
            .iter()
            .map(|(path, raw)| {
                serde_json::from_str(raw).map_err(|e| StorageError::decode(path, e))
            })
            .collect()
    }

    fn read_entries(&self, collection: &str) -> StorageResult<Vec<(PathBuf, String)>> {
        validate_name("collection", collection)?;

        let fields = [("collection", collection)];
        match self.load_all(&self.dir.join(collection)) {
            Ok(entries) => {
                let count = entries.len().to_string();
                log_event(
                    self.log.as_ref(),
                    Severity::Trace,
                    Event::ReadAllComplete,
                    &[fields[0], ("count", count.as_str())],
                );
                Ok(entries)
            }
            Err(e) => {
                self.report(Event::ReadFailed, &e, &fields);
                Err(e)
            }
        }
    }

    fn load_all(&self, dir: &Path) -> StorageResult<Vec<(PathBuf, String)>> {
        let located = locate(dir)?;

        let mut entries = fs::read_dir(&located.path)
            .map_err(|e| StorageError::io_error("failed to list collection", &located.path, e))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::io_error("failed to list collection", &located.path, e))?;
        entries.sort();

        entries
            .into_iter()
            .map(|path| match fs::read(&path) {
                Ok(bytes) => {
                    let raw = String::from_utf8_lossy(&bytes).into_owned();
                    Ok((path, raw))
                }
                Err(e) => Err(StorageError::io_error("failed to read entry", &path, e)),
            })
            .collect()
    }

    /// Removes a resource, or a whole collection when `resource` is empty.
    ///
    /// Takes the same collection lock as [`write`](Self::write). A directory
    /// match is removed recursively; a file match removes exactly the file
    /// that was found.
    pub fn delete(&self, collection: &str, resource: &str) -> StorageResult<()> {
        validate_name("collection", collection)?;
        if !resource.is_empty() {
            validate_name("resource", resource)?;
        }

        let lock = self.locks.lock_for(collection);
        let _guard = locks::acquire(&lock);

        let fields = [("collection", collection), ("resource", resource)];
        let target = if resource.is_empty() {
            self.dir.join(collection)
        } else {
            self.dir.join(collection).join(resource)
        };

        match self.remove(&target) {
            Ok(event) => {
                log_event(self.log.as_ref(), Severity::Debug, event, &fields);
                Ok(())
            }
            Err(e) => {
                self.report(Event::DeleteFailed, &e, &fields);
                Err(e)
            }
        }
    }

    fn remove(&self, target: &Path) -> StorageResult<Event> {
        let located = locate(target)?;

        maybe_crash(points::DELETE_BEFORE_REMOVE);

        if located.is_dir() {
            fs::remove_dir_all(&located.path).map_err(|e| {
                StorageError::io_error("failed to remove directory", &located.path, e)
            })?;
            Ok(Event::CollectionDeleted)
        } else {
            fs::remove_file(&located.path)
                .map_err(|e| StorageError::io_error("failed to remove file", &located.path, e))?;
            Ok(Event::ResourceDeleted)
        }
    }

    /// Not-found and validation failures are routine for callers; only
    /// I/O and decode failures are logged at ERROR.
    fn report(&self, event: Event, err: &StorageError, fields: &[(&str, &str)]) {
        let severity = if err.is_not_found() || err.is_validation() {
            Severity::Debug
        } else {
            Severity::Error
        };
        if !self.log.enabled(severity) {
            return;
        }
        let message = err.to_string();
        let mut all = fields.to_vec();
        all.push(("code", err.code().code()));
        all.push(("error", message.as_str()));
        self.log.log(severity, event.as_str(), &all);
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("dir", &self.dir)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

/// Serializes a document: tab-indented JSON followed by exactly one newline.
pub fn encode_document<T: Serialize + ?Sized>(value: &T) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| StorageError::encode("failed to serialize document", e))?;
    buf.push(b'\n');
    Ok(buf)
}

/// Lexically normalises `path`: drops `.` segments and trailing separators.
fn clean_path(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}
