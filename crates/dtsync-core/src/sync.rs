//! Document-type synchronisation against the versioned store
//!
//! [`DocTypeSync`] ties a content model, a [`DocTypeReconciler`] and a
//! [`VersionedStore`] together: exports land in the store with their
//! fingerprint embedded, imports read from it.

use crate::change::{ChangeOutcome, ChangeRecord, ItemType};
use crate::config::SyncSettings;
use crate::doctype::{DocTypeReconciler, ImportMode};
use crate::service::ContentModel;
use crate::{Error, Result};
use dtsync_fs::{NormalizedPath, VersionedStore, WatcherGuard, type_folder};
use dtsync_snapshot::DocTypeSnapshot;
use std::sync::Arc;

/// Qualified type name snapshots are filed under
const DOCUMENT_TYPE: &str = "cms.DocumentType";

/// Store category holding document-type snapshots.
pub fn category() -> &'static str {
    type_folder(DOCUMENT_TYPE)
}

/// Exports and imports document types through a [`VersionedStore`].
#[derive(Debug)]
pub struct DocTypeSync<M> {
    model: M,
    store: VersionedStore,
    reconciler: DocTypeReconciler,
    post_check: bool,
}

impl<M: ContentModel> DocTypeSync<M> {
    pub fn new(model: M, store: VersionedStore) -> Self {
        Self {
            model,
            store,
            reconciler: DocTypeReconciler::new(),
            post_check: true,
        }
    }

    /// Build the store and reconciler from settings.
    pub fn from_settings(model: M, settings: &SyncSettings, watcher: Arc<WatcherGuard>) -> Self {
        let store = VersionedStore::new(settings.store_config()).with_watcher(watcher);
        Self {
            model,
            store,
            reconciler: DocTypeReconciler::from_settings(settings),
            post_check: settings.post_check,
        }
    }

    pub fn with_reconciler(mut self, reconciler: DocTypeReconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn with_post_check(mut self, post_check: bool) -> Self {
        self.post_check = post_check;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn store(&self) -> &VersionedStore {
        &self.store
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Export a live document type and save it with its fingerprint embedded.
    pub fn export_to_store(&self, alias: &str) -> Result<NormalizedPath> {
        let content_type =
            self.model
                .content_type(alias)
                .ok_or_else(|| Error::ContentTypeNotFound {
                    alias: alias.to_string(),
                })?;

        let mut snapshot = self.reconciler.export(&self.model, &content_type);
        let fingerprint = DocTypeReconciler::fingerprint(&snapshot)?;
        snapshot.hash = Some(fingerprint.to_string());

        let path = self.store.save(category(), alias, &snapshot)?;
        tracing::info!(%alias, %fingerprint, "Exported document type");
        Ok(path)
    }

    /// Read a stored snapshot.
    pub fn load(&self, name: &str) -> Result<DocTypeSnapshot> {
        self.store
            .load(category(), name)?
            .ok_or_else(|| Error::SnapshotNotFound {
                category: category().to_string(),
                name: name.to_string(),
            })
    }

    /// Read a snapshot from a named backup set.
    pub fn load_backup(&self, backup: &str, name: &str) -> Result<Option<DocTypeSnapshot>> {
        Ok(self.store.load_backup(backup, category(), name)?)
    }

    /// Import one stored snapshot.
    pub fn import_from_store(&mut self, name: &str, mode: ImportMode) -> Result<ChangeRecord> {
        let snapshot = self.load(name)?;
        self.reconciler
            .import(&mut self.model, &snapshot, mode, self.post_check)
    }

    /// Import every stored snapshot that differs from the live model.
    ///
    /// A failing snapshot yields a `Failure` record instead of stopping the
    /// run. Types whose allowed children were imported later in the same run
    /// get a second structure pass once everything exists.
    pub fn import_all(&mut self, mode: ImportMode) -> Result<Vec<ChangeRecord>> {
        let mut records = Vec::new();
        let mut relink = Vec::new();

        for name in self.store.list(category())? {
            let snapshot = match self.load(&name) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(%name, error = %e, "Skipping unreadable snapshot");
                    records.push(ChangeRecord::failure(ItemType::DocumentType, name, e.to_string()));
                    continue;
                }
            };

            if mode == ImportMode::Auto && !self.is_changed(&snapshot)? {
                tracing::debug!(%name, "Snapshot unchanged, skipping");
                continue;
            }

            let needs_relink = self.has_unresolved_children(&snapshot);
            let record = self.import_snapshot(&name, &snapshot, mode);
            if needs_relink && record.outcome() != ChangeOutcome::Failure {
                relink.push((records.len(), snapshot));
            }
            records.push(record);
        }

        for (index, snapshot) in relink {
            let Some(live) = self.model.content_type(snapshot.alias()) else {
                continue;
            };
            tracing::debug!(alias = %live.alias, "Relinking allowed children");
            let name = records[index].name().to_string();
            records[index] = self
                .reconciler
                .fit_and_fix(&mut self.model, live, &snapshot, self.post_check)
                .unwrap_or_else(|e| ChangeRecord::failure(ItemType::DocumentType, name, e.to_string()));
        }

        Ok(records)
    }

    fn import_snapshot(
        &mut self,
        name: &str,
        snapshot: &DocTypeSnapshot,
        mode: ImportMode,
    ) -> ChangeRecord {
        self.reconciler
            .import(&mut self.model, snapshot, mode, self.post_check)
            .unwrap_or_else(|e| {
                tracing::warn!(%name, error = %e, "Import failed");
                ChangeRecord::failure(ItemType::DocumentType, name, e.to_string())
            })
    }

    fn has_unresolved_children(&self, snapshot: &DocTypeSnapshot) -> bool {
        snapshot.structure.iter().any(|s| {
            s.document_types.iter().any(|alias| {
                alias != snapshot.alias() && self.model.content_type_ref(alias).is_none()
            })
        })
    }

    /// Whether the live model differs from a snapshot.
    pub fn is_changed(&self, snapshot: &DocTypeSnapshot) -> Result<bool> {
        self.reconciler.is_changed(&self.model, snapshot)
    }

    /// Remove a stored snapshot, archiving it first when versioning is on.
    ///
    /// Returns `false` when there was nothing to remove.
    pub fn delete_from_store(&self, name: &str) -> Result<bool> {
        if self.store.config().versions {
            Ok(self.store.archive(category(), name, true).is_some())
        } else {
            Ok(self.store.delete(category(), name)?)
        }
    }
}
