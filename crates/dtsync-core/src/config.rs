//! Synchronisation settings

use crate::Result;
use dtsync_fs::{ConfigStore, NormalizedPath, StoreConfig};
use serde::{Deserialize, Serialize};

/// Settings consumed by the reconciler and the store.
///
/// Store fields (`root`, `archive_root`, `backup_root`, `extension`,
/// `versions`) sit at the top level of the file next to the reconciler flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    #[serde(flatten)]
    pub store: StoreConfig,
    /// Let fit-and-fix remove properties missing from the snapshot
    pub delete_properties: bool,
    /// Re-export after every fit-and-fix import and compare fingerprints
    pub post_check: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            delete_properties: false,
            post_check: true,
        }
    }
}

impl SyncSettings {
    /// Load settings from a TOML, JSON or YAML file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let settings: Self = ConfigStore::new().load(path)?;
        tracing::debug!(
            path = %path.as_str(),
            versions = settings.store.versions,
            delete_properties = settings.delete_properties,
            "Loaded sync settings"
        );
        Ok(settings)
    }

    pub fn store_config(&self) -> StoreConfig {
        self.store.clone()
    }
}
