//! Versioned snapshot store
//!
//! Maps a logical `(category, name)` pair to `root/category/name.ext` and
//! performs every mutation inside a watcher pause, bracketed by lifecycle
//! events. When versioning is enabled, the file being replaced is first
//! copied to `archive_root/category/name_<ddMMyy_HHmmss>.ext`.
//!
//! Archival is best effort: a failed archive is logged and never aborts the
//! save or delete it belongs to.

use crate::events::{Listeners, StoreEventKind, StoreListener};
use crate::path::scrub_file_name;
use crate::watcher::WatcherGuard;
use crate::{Error, NormalizedPath, Result, StoreConfig, io};
use chrono::{DateTime, Local};
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::sync::Arc;

/// Timestamp suffix appended to archived file names
const ARCHIVE_STAMP: &str = "%d%m%y_%H%M%S";

/// File-backed snapshot store with archival and watcher suppression.
#[derive(Debug)]
pub struct VersionedStore {
    config: StoreConfig,
    root: NormalizedPath,
    archive_root: NormalizedPath,
    backup_root: NormalizedPath,
    guard: Arc<WatcherGuard>,
    listeners: Listeners,
}

impl VersionedStore {
    /// Create a store with a detached watcher guard and no listeners.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            root: NormalizedPath::new(&config.root),
            archive_root: NormalizedPath::new(&config.archive_root),
            backup_root: NormalizedPath::new(&config.backup_root),
            config,
            guard: Arc::new(WatcherGuard::detached()),
            listeners: Listeners::new(),
        }
    }

    /// Share a watcher guard with this store.
    pub fn with_watcher(mut self, guard: Arc<WatcherGuard>) -> Self {
        self.guard = guard;
        self
    }

    /// Register a lifecycle listener.
    pub fn with_listener(mut self, listener: impl StoreListener + 'static) -> Self {
        self.listeners.register(Arc::new(listener));
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn watcher(&self) -> &Arc<WatcherGuard> {
        &self.guard
    }

    /// Live path of a snapshot.
    pub fn path_for(&self, category: &str, name: &str) -> NormalizedPath {
        self.file_under(&self.root, category, &scrub_file_name(name))
    }

    /// Archive path of a snapshot for the given instant.
    pub fn archive_path_for(
        &self,
        category: &str,
        name: &str,
        at: DateTime<Local>,
    ) -> NormalizedPath {
        let stamped = format!("{}_{}", scrub_file_name(name), at.format(ARCHIVE_STAMP));
        self.file_under(&self.archive_root, category, &stamped)
    }

    fn backup_path_for(&self, backup: &str, category: &str, name: &str) -> NormalizedPath {
        let set = self.backup_root.join(&scrub_file_name(backup));
        self.file_under(&set, category, &scrub_file_name(name))
    }

    fn file_under(&self, base: &NormalizedPath, category: &str, stem: &str) -> NormalizedPath {
        base.join(&scrub_file_name(category))
            .join(&format!("{}.{}", stem, self.config.extension))
    }

    pub fn exists(&self, category: &str, name: &str) -> bool {
        self.path_for(category, name).is_file()
    }

    /// Write a snapshot, replacing (and optionally archiving) the current file.
    pub fn save<T: Serialize + ?Sized>(
        &self,
        category: &str,
        name: &str,
        snapshot: &T,
    ) -> Result<NormalizedPath> {
        let path = self.path_for(category, name);
        let bytes = dtsync_snapshot::to_canonical_bytes(snapshot)?;

        let _paused = self.guard.pause();
        self.listeners.notify(StoreEventKind::Saving, &path);

        if path.exists() {
            if self.config.versions {
                self.archive_quietly(&path, category, name, false);
            }
            io::remove_file(&path)?;
        }

        io::write_atomic(&path, &bytes)?;
        tracing::info!(%path, "Saved snapshot");

        self.listeners.notify(StoreEventKind::Saved, &path);
        Ok(path)
    }

    /// Read a snapshot. Returns `None` when no file exists.
    pub fn load<T: DeserializeOwned>(&self, category: &str, name: &str) -> Result<Option<T>> {
        read_snapshot(&self.path_for(category, name))
    }

    /// Read a snapshot from a named backup set.
    pub fn load_backup<T: DeserializeOwned>(
        &self,
        backup: &str,
        category: &str,
        name: &str,
    ) -> Result<Option<T>> {
        read_snapshot(&self.backup_path_for(backup, category, name))
    }

    /// Names of every snapshot stored under a category, sorted.
    pub fn list(&self, category: &str) -> Result<Vec<String>> {
        let dir = self.root.join(&scrub_file_name(category));
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir.to_native()).map_err(|e| Error::io(dir.to_native(), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(dir.to_native(), e))?;
            let path = NormalizedPath::new(entry.path());
            if path.is_file()
                && path.extension() == Some(self.config.extension.as_str())
                && let Some(stem) = path.file_stem()
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Copy the live file into the archive, optionally removing the original.
    ///
    /// Returns the archive path, or `None` when nothing was archived. Failures
    /// are logged and swallowed.
    pub fn archive(&self, category: &str, name: &str, delete: bool) -> Option<NormalizedPath> {
        let path = self.path_for(category, name);
        let _paused = self.guard.pause();
        self.archive_quietly(&path, category, name, delete)
    }

    /// Remove the live file. Returns `false` when there was nothing to remove.
    pub fn delete(&self, category: &str, name: &str) -> Result<bool> {
        let path = self.path_for(category, name);
        if !path.exists() {
            return Ok(false);
        }

        let _paused = self.guard.pause();
        self.remove_notified(&path)?;
        tracing::info!(%path, "Deleted snapshot");
        Ok(true)
    }

    fn archive_quietly(
        &self,
        live: &NormalizedPath,
        category: &str,
        name: &str,
        delete: bool,
    ) -> Option<NormalizedPath> {
        match self.try_archive(live, category, name, delete) {
            Ok(archived) => archived,
            Err(e) => {
                tracing::warn!(category, name, "Failed to archive snapshot: {}", e);
                None
            }
        }
    }

    fn try_archive(
        &self,
        live: &NormalizedPath,
        category: &str,
        name: &str,
        delete: bool,
    ) -> Result<Option<NormalizedPath>> {
        if !live.is_file() {
            tracing::debug!(%live, "Nothing to archive");
            return Ok(None);
        }

        // Same-second archives overwrite each other rather than fail
        let archived = self.archive_path_for(category, name, Local::now());
        io::replace_copy(live, &archived)?;

        if delete {
            self.remove_notified(live)?;
        }

        tracing::info!(%live, %archived, "Archived snapshot");
        Ok(Some(archived))
    }

    fn remove_notified(&self, path: &NormalizedPath) -> Result<()> {
        self.listeners.notify(StoreEventKind::Deleting, path);
        io::remove_file(path)?;
        self.listeners.notify(StoreEventKind::Deleted, path);
        Ok(())
    }
}

fn read_snapshot<T: DeserializeOwned>(path: &NormalizedPath) -> Result<Option<T>> {
    if !path.is_file() {
        return Ok(None);
    }

    let bytes = io::read_bytes(path)?;
    dtsync_snapshot::from_slice(&bytes)
        .map(Some)
        .map_err(|source| Error::CorruptSnapshot {
            path: path.to_native(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn setup_store(versions: bool) -> (TempDir, VersionedStore) {
        let temp = TempDir::new().unwrap();
        let store = VersionedStore::new(StoreConfig::rooted_at(temp.path()).with_versions(versions));
        (temp, store)
    }

    #[test]
    fn path_layout() {
        let (temp, store) = setup_store(false);
        let root = NormalizedPath::new(temp.path());

        assert_eq!(
            store.path_for("DocumentType", "Home"),
            root.join("sync/DocumentType/Home.json")
        );
    }

    #[test]
    fn archive_path_has_timestamp_suffix() {
        let (temp, store) = setup_store(false);
        let root = NormalizedPath::new(temp.path());
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        assert_eq!(
            store.archive_path_for("DocumentType", "Home", at),
            root.join("sync.archive/DocumentType/Home_090324_140507.json")
        );
    }

    #[test]
    fn names_are_scrubbed_consistently() {
        let (_temp, store) = setup_store(true);
        store.save("DocumentType", "News/Item?", &json!({"v": 1})).unwrap();

        assert!(store.exists("DocumentType", "News/Item?"));
        assert!(store.exists("DocumentType", "NewsItem"));
        assert!(store.archive("DocumentType", "News/Item?", true).is_some());
        assert!(!store.exists("DocumentType", "NewsItem"));
    }

    #[test]
    fn load_missing_is_none() {
        let (_temp, store) = setup_store(false);
        let loaded: Option<Value> = store.load("DocumentType", "Nope").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_corrupt_file_is_an_error() {
        let (_temp, store) = setup_store(false);
        let path = store.path_for("DocumentType", "Broken");
        io::write_atomic(&path, b"not json").unwrap();

        let result: Result<Option<Value>> = store.load("DocumentType", "Broken");
        assert!(matches!(result, Err(Error::CorruptSnapshot { .. })));
    }

    #[test]
    fn archive_without_source_is_swallowed() {
        let (_temp, store) = setup_store(true);
        assert!(store.archive("DocumentType", "Ghost", true).is_none());
        assert!(!store.watcher().is_paused());
    }

    #[test]
    fn delete_missing_is_a_noop() {
        let (_temp, store) = setup_store(false);
        assert!(!store.delete("DocumentType", "Ghost").unwrap());
    }

    #[test]
    fn list_returns_sorted_stems() {
        let (_temp, store) = setup_store(false);
        store.save("DocumentType", "Zeta", &json!({})).unwrap();
        store.save("DocumentType", "Alpha", &json!({})).unwrap();
        store.save("DataType", "Other", &json!({})).unwrap();

        assert_eq!(store.list("DocumentType").unwrap(), vec!["Alpha", "Zeta"]);
        assert!(store.list("Dictionary").unwrap().is_empty());
    }

    #[test]
    fn load_backup_reads_named_set() {
        let (temp, store) = setup_store(false);
        let backup = NormalizedPath::new(temp.path()).join("sync.backup/nightly/DocumentType/Home.json");
        io::write_atomic(&backup, br#"{"v": 7}"#).unwrap();

        let loaded: Option<Value> = store.load_backup("nightly", "DocumentType", "Home").unwrap();
        assert_eq!(loaded, Some(json!({"v": 7})));
        let missing: Option<Value> = store.load_backup("weekly", "DocumentType", "Home").unwrap();
        assert!(missing.is_none());
    }
}
