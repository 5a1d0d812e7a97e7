//! In-process content model
//!
//! A complete [`ContentModel`] backed by plain collections. Embedders use it
//! to stage a model before pushing it elsewhere; the test suites use it as
//! the live side of every reconciliation.

use crate::model::{AllowedChild, ContentType, DataTypeDefinition, PropertyGroup, PropertyType};
use crate::service::ContentModel;
use crate::{Error, Result};
use dtsync_snapshot::{DocTypeSnapshot, GenericProperty};
use std::collections::BTreeMap;
use uuid::Uuid;

const FIRST_ID: i32 = 1000;

/// Content types and data types held in memory, keyed by alias.
#[derive(Debug)]
pub struct InMemoryContentModel {
    content_types: BTreeMap<String, ContentType>,
    data_types: Vec<DataTypeDefinition>,
    next_id: i32,
    reject_validation: bool,
    saves: usize,
}

impl Default for InMemoryContentModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContentModel {
    pub fn new() -> Self {
        Self {
            content_types: BTreeMap::new(),
            data_types: Vec::new(),
            next_id: FIRST_ID,
            reject_validation: false,
            saves: 0,
        }
    }

    pub fn with_data_type(mut self, data_type: DataTypeDefinition) -> Self {
        self.data_types.push(data_type);
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.insert_content_type(content_type);
        self
    }

    /// Add or replace a content type. An id of `0` is replaced by a fresh one.
    pub fn insert_content_type(&mut self, mut content_type: ContentType) -> i32 {
        if content_type.id == 0 {
            content_type.id = self.allocate_id();
        }
        let id = content_type.id;
        self.content_types
            .insert(content_type.alias.clone(), content_type);
        id
    }

    /// Silently keep the stored validation pattern on every save.
    pub fn reject_validation_updates(&mut self, reject: bool) {
        self.reject_validation = reject;
    }

    /// Number of successful [`ContentModel::save_content_type`] calls.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.content_types.keys().map(String::as_str)
    }

    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Definition a snapshot property points at: by unique key, then by editor.
    fn resolve_definition(&self, property: &GenericProperty) -> Option<&DataTypeDefinition> {
        let by_key = Uuid::parse_str(&property.definition)
            .ok()
            .and_then(|key| self.data_types.iter().find(|dt| dt.key == key));
        by_key.or_else(|| {
            self.data_types
                .iter()
                .find(|dt| !property.data_type.is_empty() && dt.editor_alias == property.data_type)
        })
    }

    fn build(&mut self, snapshot: &DocTypeSnapshot, alias: &str) -> ContentType {
        let existing = self.content_types.get(alias);
        let mut content_type = ContentType {
            id: existing.map(|ct| ct.id).unwrap_or_default(),
            key: existing.map(|ct| ct.key).unwrap_or_else(Uuid::new_v4),
            alias: alias.to_string(),
            ..ContentType::default()
        };
        if content_type.id == 0 {
            content_type.id = self.allocate_id();
        }

        if let Some(info) = &snapshot.info {
            content_type.name = info.name.clone().unwrap_or_default();
            content_type.icon = info.icon.clone();
            content_type.thumbnail = info.thumbnail.clone();
            content_type.description = info.description.clone();
            content_type.allow_at_root = info.allow_at_root;
            content_type.master = info.master.clone().filter(|m| !m.is_empty());
        }

        for (index, tab) in snapshot.tabs.iter().flatten().enumerate() {
            let id = self.allocate_id();
            content_type.property_groups.push(PropertyGroup {
                id,
                name: tab.caption.clone(),
                sort_order: tab.sort_order.unwrap_or(index as i32),
            });
        }

        for (index, source) in snapshot.properties().iter().enumerate() {
            let Some(data_type_id) = self.resolve_definition(source).map(|dt| dt.id) else {
                tracing::debug!(alias = %source.alias, "No data type for property, skipping");
                continue;
            };

            let group_id = match source.tab_name() {
                Some(caption) => Some(match content_type.group(caption) {
                    Some(group) => group.id,
                    None => {
                        let id = self.allocate_id();
                        let sort_order = content_type.property_groups.len() as i32;
                        content_type.property_groups.push(PropertyGroup {
                            id,
                            name: caption.to_string(),
                            sort_order,
                        });
                        id
                    }
                }),
                None => None,
            };

            content_type.properties.push(PropertyType {
                alias: source.alias.clone(),
                name: source.name.clone(),
                description: source.description.clone(),
                mandatory: source.mandatory,
                validation: Some(source.validation.clone()).filter(|v| !v.is_empty()),
                sort_order: source.sort_order.unwrap_or(index as i32),
                data_type_id,
                group_id,
            });
        }

        let children = snapshot
            .structure
            .iter()
            .flat_map(|s| s.document_types.iter())
            .filter_map(|child| {
                if child == alias {
                    Some(content_type.to_ref())
                } else {
                    self.content_type_ref(child)
                }
            })
            .enumerate()
            .map(|(index, child)| AllowedChild {
                id: child.id,
                alias: child.alias,
                name: child.name,
                sort_order: index as i32,
            })
            .collect();
        content_type.set_allowed_children(children);

        content_type
    }
}

impl ContentModel for InMemoryContentModel {
    fn import_full(&mut self, snapshot: &DocTypeSnapshot) -> Result<()> {
        let alias = snapshot.alias().to_string();
        if alias.is_empty() {
            return Err(Error::MissingField { field: "Info.Alias" });
        }
        let content_type = self.build(snapshot, &alias);
        self.content_types.insert(alias, content_type);
        Ok(())
    }

    fn content_type(&self, alias: &str) -> Option<ContentType> {
        self.content_types.get(alias).cloned()
    }

    fn data_type(&self, id: i32) -> Option<DataTypeDefinition> {
        self.data_types.iter().find(|dt| dt.id == id).cloned()
    }

    fn data_type_by_key(&self, key: &Uuid) -> Option<DataTypeDefinition> {
        self.data_types.iter().find(|dt| &dt.key == key).cloned()
    }

    fn save_content_type(&mut self, content_type: &ContentType) -> Result<()> {
        let Some(stored) = self.content_types.get(&content_type.alias) else {
            return Err(Error::ContentTypeNotFound {
                alias: content_type.alias.clone(),
            });
        };

        if let Some(property) = content_type
            .properties
            .iter()
            .find(|p| !self.data_types.iter().any(|dt| dt.id == p.data_type_id))
        {
            return Err(Error::Model {
                message: format!(
                    "property {} references unknown data type {}",
                    property.alias, property.data_type_id
                ),
            });
        }

        let mut updated = content_type.clone();
        if self.reject_validation {
            for property in &mut updated.properties {
                property.validation = stored
                    .property(&property.alias)
                    .and_then(|p| p.validation.clone());
            }
        }

        self.content_types.insert(updated.alias.clone(), updated);
        self.saves += 1;
        Ok(())
    }
}
