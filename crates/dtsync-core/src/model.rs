//! Live content-model entities
//!
//! These are the values the content-model service hands out and takes back.
//! The reconciler edits a [`ContentType`] through the mutators below and then
//! passes it to [`ContentModel::save_content_type`](crate::ContentModel::save_content_type).

use uuid::Uuid;

/// A document type as held by the content-model service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentType {
    pub id: i32,
    pub key: Uuid,
    pub alias: String,
    pub name: String,
    pub icon: String,
    pub thumbnail: String,
    pub description: String,
    pub allow_at_root: bool,
    /// Alias of the parent document type
    pub master: Option<String>,
    pub allowed_children: Vec<AllowedChild>,
    pub property_groups: Vec<PropertyGroup>,
    pub properties: Vec<PropertyType>,
}

/// A content type permitted below another, with its position in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedChild {
    pub id: i32,
    pub alias: String,
    pub name: String,
    pub sort_order: i32,
}

/// A tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyGroup {
    pub id: i32,
    pub name: String,
    pub sort_order: i32,
}

/// A property definition on a content type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyType {
    pub alias: String,
    pub name: String,
    pub description: String,
    pub mandatory: bool,
    pub validation: Option<String>,
    pub sort_order: i32,
    pub data_type_id: i32,
    /// Id of the owning tab, if any
    pub group_id: Option<i32>,
}

/// A configured data type that properties point at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTypeDefinition {
    pub id: i32,
    pub key: Uuid,
    pub name: String,
    /// Identifier of the editor backing the definition
    pub editor_alias: String,
}

/// Lightweight reference to a content type, as used in allowed-children lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeRef {
    pub id: i32,
    pub alias: String,
    pub name: String,
}

impl ContentType {
    pub fn new(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            name: name.into(),
            key: Uuid::new_v4(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    pub fn with_group(mut self, id: i32, name: impl Into<String>, sort_order: i32) -> Self {
        self.property_groups.push(PropertyGroup {
            id,
            name: name.into(),
            sort_order,
        });
        self
    }

    pub fn with_property(mut self, property: PropertyType) -> Self {
        self.properties.push(property);
        self
    }

    pub fn to_ref(&self) -> ContentTypeRef {
        ContentTypeRef {
            id: self.id,
            alias: self.alias.clone(),
            name: self.name.clone(),
        }
    }

    pub fn property(&self, alias: &str) -> Option<&PropertyType> {
        self.properties.iter().find(|p| p.alias == alias)
    }

    pub fn property_mut(&mut self, alias: &str) -> Option<&mut PropertyType> {
        self.properties.iter_mut().find(|p| p.alias == alias)
    }

    /// Tab by caption.
    pub fn group(&self, caption: &str) -> Option<&PropertyGroup> {
        self.property_groups.iter().find(|g| g.name == caption)
    }

    /// Tab by caption, for editing its sort order.
    pub fn group_mut(&mut self, caption: &str) -> Option<&mut PropertyGroup> {
        self.property_groups.iter_mut().find(|g| g.name == caption)
    }

    pub fn group_by_id(&self, id: i32) -> Option<&PropertyGroup> {
        self.property_groups.iter().find(|g| g.id == id)
    }

    /// Caption of the tab a property belongs to.
    pub fn tab_of(&self, property: &PropertyType) -> Option<&str> {
        property
            .group_id
            .and_then(|id| self.group_by_id(id))
            .map(|g| g.name.as_str())
    }

    /// Aliases of the properties in a tab.
    pub fn properties_in(&self, caption: &str) -> Vec<&str> {
        let Some(group) = self.group(caption) else {
            return Vec::new();
        };
        self.properties
            .iter()
            .filter(|p| p.group_id == Some(group.id))
            .map(|p| p.alias.as_str())
            .collect()
    }

    /// Remove a property. Returns `false` when no property has the alias.
    pub fn remove_property(&mut self, alias: &str) -> bool {
        let before = self.properties.len();
        self.properties.retain(|p| p.alias != alias);
        self.properties.len() != before
    }

    /// Move a property into an existing tab.
    ///
    /// Returns `false` when either the property or the tab does not exist.
    pub fn move_property(&mut self, alias: &str, caption: &str) -> bool {
        let Some(group_id) = self.group(caption).map(|g| g.id) else {
            return false;
        };
        match self.property_mut(alias) {
            Some(property) => {
                property.group_id = Some(group_id);
                true
            }
            None => false,
        }
    }

    /// Replace the allowed-children list.
    pub fn set_allowed_children(&mut self, children: Vec<AllowedChild>) {
        self.allowed_children = children;
    }
}

impl PropertyType {
    pub fn new(alias: impl Into<String>, name: impl Into<String>, data_type_id: i32) -> Self {
        Self {
            alias: alias.into(),
            name: name.into(),
            data_type_id,
            ..Default::default()
        }
    }

    pub fn in_group(mut self, group_id: i32) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_validation(mut self, pattern: impl Into<String>) -> Self {
        self.validation = Some(pattern.into());
        self
    }
}

impl DataTypeDefinition {
    pub fn new(id: i32, name: impl Into<String>, editor_alias: impl Into<String>) -> Self {
        Self {
            id,
            key: Uuid::new_v4(),
            name: name.into(),
            editor_alias: editor_alias.into(),
        }
    }
}
