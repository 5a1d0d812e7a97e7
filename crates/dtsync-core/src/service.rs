//! The content-model capability consumed by the reconciler
//!
//! The content-model service owns every live entity. The reconciler only
//! reads copies through this trait, edits them, and hands them back through
//! [`ContentModel::save_content_type`].

use crate::Result;
use crate::model::{ContentType, ContentTypeRef, DataTypeDefinition};
use dtsync_snapshot::{DocTypeInfo, DocTypeSnapshot, GenericProperty, Structure, TabSnapshot};
use uuid::Uuid;

/// Capability surface of an external content-model service.
pub trait ContentModel {
    /// Create or overwrite a document type wholesale from a snapshot.
    fn import_full(&mut self, snapshot: &DocTypeSnapshot) -> Result<()>;

    /// Current state of a document type.
    fn content_type(&self, alias: &str) -> Option<ContentType>;

    /// Resolve a document type reference by alias.
    fn content_type_ref(&self, alias: &str) -> Option<ContentTypeRef> {
        self.content_type(alias).map(|ct| ct.to_ref())
    }

    fn data_type(&self, id: i32) -> Option<DataTypeDefinition>;

    fn data_type_by_key(&self, key: &Uuid) -> Option<DataTypeDefinition>;

    /// Persist an edited document type.
    fn save_content_type(&mut self, content_type: &ContentType) -> Result<()>;

    /// The service's own serialization of a document type.
    ///
    /// Sections come out in storage order; the reconciler rebuilds the
    /// ordered ones before a snapshot is written.
    fn export_native(&self, content_type: &ContentType) -> DocTypeSnapshot {
        let properties = content_type
            .properties
            .iter()
            .map(|property| {
                let data_type = self.data_type(property.data_type_id);
                GenericProperty {
                    name: property.name.clone(),
                    alias: property.alias.clone(),
                    data_type: data_type
                        .as_ref()
                        .map(|dt| dt.editor_alias.clone())
                        .unwrap_or_default(),
                    definition: data_type.map(|dt| dt.key.to_string()).unwrap_or_default(),
                    tab: content_type.tab_of(property).map(str::to_string),
                    mandatory: property.mandatory,
                    validation: property.validation.clone().unwrap_or_default(),
                    description: property.description.clone(),
                    sort_order: Some(property.sort_order),
                }
            })
            .collect();

        let tabs = content_type
            .property_groups
            .iter()
            .map(|group| TabSnapshot {
                id: group.id,
                caption: group.name.clone(),
                sort_order: Some(group.sort_order),
            })
            .collect();

        let mut children: Vec<_> = content_type.allowed_children.iter().collect();
        children.sort_by_key(|child| child.sort_order);

        DocTypeSnapshot {
            info: Some(DocTypeInfo {
                name: Some(content_type.name.clone()),
                alias: content_type.alias.clone(),
                icon: content_type.icon.clone(),
                thumbnail: content_type.thumbnail.clone(),
                description: content_type.description.clone(),
                allow_at_root: content_type.allow_at_root,
                master: content_type.master.clone(),
            }),
            structure: Some(Structure {
                document_types: children.into_iter().map(|c| c.alias.clone()).collect(),
            }),
            generic_properties: Some(properties),
            tabs: Some(tabs),
            hash: None,
        }
    }
}
