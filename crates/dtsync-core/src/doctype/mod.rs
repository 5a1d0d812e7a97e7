//! Document-type reconciliation
//!
//! Export turns a live content type into a canonical snapshot. Import goes
//! the other way, either by handing the whole snapshot to the content-model
//! service ([`DocTypeReconciler::import_full`]) or by editing the live type
//! in place until it matches ([`DocTypeReconciler::fit_and_fix`]).
//!
//! The reconciler never touches the filesystem; reading and writing
//! snapshots is [`DocTypeSync`](crate::DocTypeSync)'s job.

mod export;
mod import;

pub use import::ImportMode;

use crate::config::SyncSettings;
use crate::model::ContentType;
use crate::service::ContentModel;
use crate::Result;
use dtsync_snapshot::{DocTypeSnapshot, Fingerprint, recompute};

/// Applies snapshots to, and derives snapshots from, a content model.
#[derive(Debug, Clone, Default)]
pub struct DocTypeReconciler {
    delete_properties: bool,
}

impl DocTypeReconciler {
    /// A reconciler that never removes properties.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            delete_properties: settings.delete_properties,
        }
    }

    /// Allow fit-and-fix to remove properties the snapshot no longer lists.
    pub fn with_delete_properties(mut self, delete_properties: bool) -> Self {
        self.delete_properties = delete_properties;
        self
    }

    pub fn deletes_properties(&self) -> bool {
        self.delete_properties
    }

    /// Fingerprint used whenever a live type is compared with a snapshot.
    ///
    /// Both sides of every comparison go through this, so the embedded hash
    /// and tab ids are always excluded the same way. Properties and tabs are
    /// put in export order first, so a hand-edited file that only reorders
    /// them still matches.
    pub fn fingerprint(snapshot: &DocTypeSnapshot) -> Result<Fingerprint> {
        let mut ordered = snapshot.clone();
        if let Some(properties) = ordered.generic_properties.as_mut() {
            properties.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.alias.cmp(&b.alias)));
        }
        if let Some(tabs) = ordered.tabs.as_mut() {
            tabs.sort_by(|a, b| {
                a.sort_order
                    .cmp(&b.sort_order)
                    .then_with(|| a.caption.cmp(&b.caption))
            });
        }
        Ok(recompute(&ordered, true)?)
    }

    /// Whether the live type differs from the snapshot.
    ///
    /// A snapshot with no live counterpart always counts as changed.
    pub fn is_changed<M: ContentModel + ?Sized>(
        &self,
        model: &M,
        snapshot: &DocTypeSnapshot,
    ) -> Result<bool> {
        match model.content_type(snapshot.alias()) {
            Some(live) => self.differs(model, &live, snapshot),
            None => Ok(true),
        }
    }

    fn differs<M: ContentModel + ?Sized>(
        &self,
        model: &M,
        live: &ContentType,
        snapshot: &DocTypeSnapshot,
    ) -> Result<bool> {
        let exported = self.export(model, live);
        let current = Self::fingerprint(&exported)?;
        let target = Self::fingerprint(&fill_absent(snapshot, &exported))?;
        if current != target {
            tracing::debug!(alias = %live.alias, %current, %target, "Live type differs from snapshot");
        }
        Ok(current != target)
    }
}

/// Copy of `snapshot` with its omitted optional values taken from `exported`.
///
/// Import leaves whatever a snapshot omits untouched (a missing `Tabs`
/// section, a property without `SortOrder` or `Tab`), so those gaps must not
/// count as differences.
fn fill_absent(snapshot: &DocTypeSnapshot, exported: &DocTypeSnapshot) -> DocTypeSnapshot {
    let mut filled = snapshot.clone();

    match filled.tabs.as_mut() {
        None => filled.tabs = exported.tabs.clone(),
        Some(tabs) => {
            for tab in tabs.iter_mut().filter(|t| t.sort_order.is_none()) {
                tab.sort_order = exported.tab(&tab.caption).and_then(|t| t.sort_order);
            }
        }
    }

    match filled.generic_properties.as_mut() {
        None => filled.generic_properties = exported.generic_properties.clone(),
        Some(properties) => {
            for property in properties.iter_mut() {
                let Some(live) = exported.property(&property.alias) else {
                    continue;
                };
                if property.sort_order.is_none() {
                    property.sort_order = live.sort_order;
                }
                if property.tab_name().is_none() {
                    property.tab = live.tab.clone();
                }
            }
        }
    }

    filled
}
