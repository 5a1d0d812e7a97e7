//! Snapshot to live content type

use super::DocTypeReconciler;
use crate::change::{ChangeRecord, ItemType};
use crate::model::{AllowedChild, ContentType};
use crate::service::ContentModel;
use crate::{Error, Result};
use dtsync_snapshot::DocTypeSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// How [`DocTypeReconciler::import`] picks an import path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Fit-and-fix when the type already exists, full import otherwise
    #[default]
    Auto,
    /// Always hand the whole snapshot to the service
    Replace,
}

/// Display name every change record is built from.
fn required_name(snapshot: &DocTypeSnapshot) -> Result<&str> {
    let info = snapshot
        .info
        .as_ref()
        .ok_or(Error::MissingSection { section: "Info" })?;
    info.name
        .as_deref()
        .ok_or(Error::MissingField { field: "Info.Name" })
}

impl DocTypeReconciler {
    /// Import a snapshot, choosing the path by `mode`.
    pub fn import<M: ContentModel + ?Sized>(
        &self,
        model: &mut M,
        snapshot: &DocTypeSnapshot,
        mode: ImportMode,
        post_check: bool,
    ) -> Result<ChangeRecord> {
        match mode {
            ImportMode::Replace => self.import_full(model, snapshot),
            ImportMode::Auto => match model.content_type(snapshot.alias()) {
                Some(live) => self.fit_and_fix(model, live, snapshot, post_check),
                None => self.import_full(model, snapshot),
            },
        }
    }

    /// Replace the document type wholesale through the service.
    pub fn import_full<M: ContentModel + ?Sized>(
        &self,
        model: &mut M,
        snapshot: &DocTypeSnapshot,
    ) -> Result<ChangeRecord> {
        let name = required_name(snapshot)?;
        model.import_full(snapshot)?;
        tracing::info!(alias = snapshot.alias(), "Imported document type");

        let record = ChangeRecord::success(ItemType::DocumentType, name);
        Ok(match model.content_type(snapshot.alias()) {
            Some(live) => record.with_id(live.id),
            None => record,
        })
    }

    /// Edit `live` in place until it matches `snapshot`, then save it.
    ///
    /// Identity (ids, key, relations) of the live type is kept. With
    /// `post_check`, the saved type is exported again and a fingerprint
    /// disagreement turns the record into a mismatch.
    pub fn fit_and_fix<M: ContentModel + ?Sized>(
        &self,
        model: &mut M,
        mut live: ContentType,
        snapshot: &DocTypeSnapshot,
        post_check: bool,
    ) -> Result<ChangeRecord> {
        let name = required_name(snapshot)?;
        let structure = snapshot
            .structure
            .as_ref()
            .ok_or(Error::MissingSection { section: "Structure" })?;

        if let Some(info) = &snapshot.info {
            live.description = info.description.clone();
            live.thumbnail = info.thumbnail.clone();
        }

        let children = structure
            .document_types
            .iter()
            .filter_map(|alias| {
                let child = model.content_type_ref(alias);
                if child.is_none() {
                    tracing::debug!(%alias, "Allowed child not found, dropping");
                }
                child
            })
            .enumerate()
            .map(|(index, child)| AllowedChild {
                id: child.id,
                alias: child.alias,
                name: child.name,
                sort_order: index as i32,
            })
            .collect();
        live.set_allowed_children(children);

        self.remove_orphans(&mut live, snapshot);
        apply_tab_order(&mut live, snapshot);
        let pending = update_properties(&*model, &mut live, snapshot);

        for (alias, caption) in &pending {
            if live.move_property(alias, caption) {
                tracing::debug!(%alias, tab = %caption, "Moved property");
            }
        }

        model.save_content_type(&live)?;
        tracing::info!(alias = %live.alias, "Updated document type");

        let record = if post_check && self.still_differs(&*model, &live.alias, snapshot)? {
            tracing::warn!(alias = %live.alias, "Document type still differs from snapshot after import");
            ChangeRecord::mismatch(ItemType::DocumentType, name)
        } else {
            ChangeRecord::success(ItemType::DocumentType, name)
        };
        Ok(record.with_id(live.id))
    }

    fn remove_orphans(&self, live: &mut ContentType, snapshot: &DocTypeSnapshot) {
        if snapshot.generic_properties.is_none() {
            return;
        }
        if !self.delete_properties {
            tracing::debug!(alias = %live.alias, "Property removal disabled, skipping removal pass");
            return;
        }

        let orphans: Vec<String> = live
            .properties
            .iter()
            .filter(|p| snapshot.property(&p.alias).is_none())
            .map(|p| p.alias.clone())
            .collect();
        for alias in orphans {
            if live.remove_property(&alias) {
                tracing::info!(%alias, "Removed property");
            }
        }
    }

    fn still_differs<M: ContentModel + ?Sized>(
        &self,
        model: &M,
        alias: &str,
        snapshot: &DocTypeSnapshot,
    ) -> Result<bool> {
        let saved = model
            .content_type(alias)
            .ok_or_else(|| Error::ContentTypeNotFound {
                alias: alias.to_string(),
            })?;
        self.differs(model, &saved, snapshot)
    }
}

fn apply_tab_order(live: &mut ContentType, snapshot: &DocTypeSnapshot) {
    for tab in snapshot.tabs.iter().flatten() {
        if let Some(sort_order) = tab.sort_order
            && let Some(group) = live.group_mut(&tab.caption)
        {
            group.sort_order = sort_order;
        }
    }
}

/// Update matching properties and collect the tab moves they need.
///
/// Moves are only recorded here; applying them while iterating the
/// property list would change the list under the loop.
fn update_properties<M: ContentModel + ?Sized>(
    model: &M,
    live: &mut ContentType,
    snapshot: &DocTypeSnapshot,
) -> BTreeMap<String, String> {
    let mut pending = BTreeMap::new();
    if snapshot.generic_properties.is_none() {
        return pending;
    }

    let groups: BTreeMap<String, i32> = live
        .property_groups
        .iter()
        .map(|g| (g.name.clone(), g.id))
        .collect();

    for property in &mut live.properties {
        let Some(source) = snapshot.property(&property.alias) else {
            continue;
        };

        property.name = source.name.clone();
        property.alias = source.alias.clone();
        property.mandatory = source.mandatory;
        property.validation = Some(source.validation.clone()).filter(|v| !v.is_empty());
        property.description = source.description.clone();
        if let Some(sort_order) = source.sort_order {
            property.sort_order = sort_order;
        }

        if let Ok(key) = Uuid::parse_str(&source.definition)
            && let Some(definition) = model.data_type_by_key(&key)
            && definition.id != property.data_type_id
        {
            tracing::debug!(alias = %property.alias, data_type = definition.id, "Retargeted property");
            property.data_type_id = definition.id;
        }

        if let Some(caption) = source.tab_name()
            && let Some(&group_id) = groups.get(caption)
            && property.group_id != Some(group_id)
        {
            pending.insert(property.alias.clone(), caption.to_string());
        }
    }

    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryContentModel;
    use crate::model::{DataTypeDefinition, PropertyType};
    use pretty_assertions::assert_eq;

    fn model_with_home() -> InMemoryContentModel {
        let home = ContentType::new("home", "Home")
            .with_group(1, "Content", 0)
            .with_group(2, "Meta", 1)
            .with_property(PropertyType::new("title", "Title", 10).in_group(2))
            .with_property(PropertyType::new("body", "Body", 10).in_group(2));
        InMemoryContentModel::new()
            .with_data_type(DataTypeDefinition::new(10, "Textstring", "Umbraco.Textbox"))
            .with_data_type(DataTypeDefinition::new(11, "Textarea", "Umbraco.TextboxMultiple"))
            .with_content_type(home)
            .with_content_type(ContentType::new("page", "Page"))
    }

    fn exported(model: &InMemoryContentModel) -> DocTypeSnapshot {
        let home = model.content_type("home").unwrap();
        DocTypeReconciler::new().export(model, &home)
    }

    #[test]
    fn missing_name_is_a_hard_error() {
        let mut model = model_with_home();
        let mut snapshot = exported(&model);
        snapshot.info.as_mut().unwrap().name = None;

        let result = DocTypeReconciler::new().import_full(&mut model, &snapshot);
        assert!(matches!(result, Err(Error::MissingField { field: "Info.Name" })));
    }

    #[test]
    fn missing_structure_is_a_hard_error() {
        let mut model = model_with_home();
        let mut snapshot = exported(&model);
        snapshot.structure = None;
        let live = model.content_type("home").unwrap();

        let result = DocTypeReconciler::new().fit_and_fix(&mut model, live, &snapshot, false);
        assert!(matches!(result, Err(Error::MissingSection { section: "Structure" })));
        assert_eq!(model.save_count(), 0);
    }

    #[test]
    fn structure_is_replaced_in_snapshot_order() {
        let mut model = model_with_home();
        let mut snapshot = exported(&model);
        snapshot.structure.as_mut().unwrap().document_types =
            vec!["page".into(), "gone".into(), "home".into()];
        let live = model.content_type("home").unwrap();

        DocTypeReconciler::new()
            .fit_and_fix(&mut model, live, &snapshot, false)
            .unwrap();

        let home = model.content_type("home").unwrap();
        let children: Vec<_> = home
            .allowed_children
            .iter()
            .map(|c| (c.alias.as_str(), c.sort_order))
            .collect();
        assert_eq!(children, vec![("page", 0), ("home", 1)]);
    }

    #[test]
    fn tab_sort_order_applies_to_existing_tabs_only() {
        let mut model = model_with_home();
        let mut snapshot = exported(&model);
        let tabs = snapshot.tabs.as_mut().unwrap();
        tabs[0].sort_order = Some(5);
        tabs[1].sort_order = None;
        tabs.push(dtsync_snapshot::TabSnapshot {
            id: 0,
            caption: "Settings".into(),
            sort_order: Some(9),
        });
        let live = model.content_type("home").unwrap();

        DocTypeReconciler::new()
            .fit_and_fix(&mut model, live, &snapshot, false)
            .unwrap();

        let home = model.content_type("home").unwrap();
        assert_eq!(home.group("Content").unwrap().sort_order, 5);
        assert_eq!(home.group("Meta").unwrap().sort_order, 1);
        assert!(home.group("Settings").is_none());
    }

    #[test]
    fn empty_tab_leaves_assignment_alone() {
        let mut model = model_with_home();
        let mut snapshot = exported(&model);
        for property in snapshot.generic_properties.as_mut().unwrap() {
            property.tab = Some(String::new());
        }
        let live = model.content_type("home").unwrap();

        DocTypeReconciler::new()
            .fit_and_fix(&mut model, live, &snapshot, false)
            .unwrap();

        let home = model.content_type("home").unwrap();
        assert_eq!(home.properties_in("Meta"), vec!["title", "body"]);
    }

    #[test]
    fn definition_key_retargets_data_type() {
        let mut model = model_with_home();
        let textarea_key = model.data_type(11).unwrap().key;
        let mut snapshot = exported(&model);
        for property in snapshot.generic_properties.as_mut().unwrap() {
            if property.alias == "body" {
                property.definition = textarea_key.to_string();
            }
            if property.alias == "title" {
                property.definition = Uuid::new_v4().to_string();
            }
        }
        let live = model.content_type("home").unwrap();

        DocTypeReconciler::new()
            .fit_and_fix(&mut model, live, &snapshot, false)
            .unwrap();

        let home = model.content_type("home").unwrap();
        assert_eq!(home.property("body").unwrap().data_type_id, 11);
        assert_eq!(home.property("title").unwrap().data_type_id, 10);
    }

    #[test]
    fn missing_properties_section_changes_nothing() {
        let mut model = model_with_home();
        let mut snapshot = exported(&model);
        snapshot.generic_properties = None;
        let live = model.content_type("home").unwrap();

        DocTypeReconciler::new()
            .with_delete_properties(true)
            .fit_and_fix(&mut model, live, &snapshot, false)
            .unwrap();

        assert_eq!(model.content_type("home").unwrap().properties.len(), 2);
    }

    #[test]
    fn auto_mode_picks_path_by_existence() {
        let mut model = model_with_home();
        let mut snapshot = exported(&model);
        let reconciler = DocTypeReconciler::new();

        reconciler
            .import(&mut model, &snapshot, ImportMode::Auto, true)
            .unwrap();
        assert_eq!(model.save_count(), 1);

        let info = snapshot.info.as_mut().unwrap();
        info.alias = "landing".into();
        info.name = Some("Landing".into());
        let record = reconciler
            .import(&mut model, &snapshot, ImportMode::Auto, true)
            .unwrap();
        assert_eq!(record.name(), "Landing");
        assert_eq!(model.save_count(), 1);
        assert!(model.content_type("landing").is_some());
    }
}
