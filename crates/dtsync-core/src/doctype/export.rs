//! Live content type to snapshot

use super::DocTypeReconciler;
use crate::model::ContentType;
use crate::service::ContentModel;
use dtsync_snapshot::{DocTypeSnapshot, GenericProperty, TabSnapshot};

impl DocTypeReconciler {
    /// Export a content type as a canonical snapshot.
    ///
    /// Starts from the service's native export and rebuilds
    /// `GenericProperties` (by name) and `Tabs` (by sort order) from the live
    /// type, so the result depends only on the current model state.
    pub fn export<M: ContentModel + ?Sized>(
        &self,
        model: &M,
        content_type: &ContentType,
    ) -> DocTypeSnapshot {
        let mut snapshot = model.export_native(content_type);
        snapshot.generic_properties = Some(rebuild_properties(model, content_type));
        snapshot.tabs = Some(rebuild_tabs(content_type));
        snapshot.hash = None;
        snapshot
    }
}

fn rebuild_properties<M: ContentModel + ?Sized>(
    model: &M,
    content_type: &ContentType,
) -> Vec<GenericProperty> {
    let mut properties: Vec<_> = content_type.properties.iter().collect();
    properties.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.alias.cmp(&b.alias)));

    properties
        .into_iter()
        .map(|property| {
            let definition = model.data_type(property.data_type_id);
            GenericProperty {
                name: property.name.clone(),
                alias: property.alias.clone(),
                data_type: definition
                    .as_ref()
                    .map(|d| d.editor_alias.clone())
                    .unwrap_or_default(),
                definition: definition.map(|d| d.key.to_string()).unwrap_or_default(),
                tab: content_type.tab_of(property).map(str::to_string),
                mandatory: property.mandatory,
                validation: property.validation.clone().unwrap_or_default(),
                description: property.description.clone(),
                sort_order: Some(property.sort_order),
            }
        })
        .collect()
}

fn rebuild_tabs(content_type: &ContentType) -> Vec<TabSnapshot> {
    let mut groups: Vec<_> = content_type.property_groups.iter().collect();
    groups.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));

    groups
        .into_iter()
        .map(|group| TabSnapshot {
            id: group.id,
            caption: group.name.clone(),
            sort_order: Some(group.sort_order),
        })
        .collect()
}
