//! Document-type snapshot schema

use crate::fingerprint::{ExclusionPolicy, Snapshot};
use serde::{Deserialize, Serialize};

/// Canonical snapshot of a document type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DocTypeSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DocTypeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_properties: Option<Vec<GenericProperty>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Vec<TabSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Scalar metadata of a document type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DocTypeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub alias: String,
    pub icon: String,
    pub thumbnail: String,
    pub description: String,
    pub allow_at_root: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
}

/// Allowed child content types, by alias, in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Structure {
    #[serde(rename = "DocumentType")]
    pub document_types: Vec<String>,
}

/// One property definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct GenericProperty {
    pub name: String,
    pub alias: String,
    /// Identifier of the data-type editor
    #[serde(rename = "Type")]
    pub data_type: String,
    /// Unique key of the data-type definition
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
    pub mandatory: bool,
    pub validation: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

/// One property group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TabSnapshot {
    pub id: i32,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl DocTypeSnapshot {
    /// Display name declared in `Info`, if any.
    pub fn name(&self) -> Option<&str> {
        self.info.as_ref().and_then(|info| info.name.as_deref())
    }

    /// Alias declared in `Info`; empty when the section is missing.
    pub fn alias(&self) -> &str {
        self.info.as_ref().map(|info| info.alias.as_str()).unwrap_or("")
    }

    /// Properties declared in the snapshot, empty when the section is missing.
    pub fn properties(&self) -> &[GenericProperty] {
        self.generic_properties.as_deref().unwrap_or(&[])
    }

    pub fn property(&self, alias: &str) -> Option<&GenericProperty> {
        self.properties().iter().find(|p| p.alias == alias)
    }

    pub fn tab(&self, caption: &str) -> Option<&TabSnapshot> {
        self.tabs.as_deref()?.iter().find(|t| t.caption == caption)
    }
}

impl GenericProperty {
    /// Owning tab, treating an empty caption the same as no tab.
    pub fn tab_name(&self) -> Option<&str> {
        self.tab.as_deref().filter(|tab| !tab.is_empty())
    }
}

impl Snapshot for DocTypeSnapshot {
    fn exclusion_policy() -> ExclusionPolicy {
        ExclusionPolicy::new(["Tabs.Id"])
    }

    fn embedded_hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_embedded_hash(&mut self, hash: Option<String>) {
        self.hash = hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_slice, to_canonical_bytes};
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_sections_deserialize_as_none() {
        let snapshot: DocTypeSnapshot =
            from_slice(br#"{"Info": {"Name": "Home", "Alias": "home"}}"#).unwrap();

        assert_eq!(snapshot.name(), Some("Home"));
        assert_eq!(snapshot.alias(), "home");
        assert!(snapshot.structure.is_none());
        assert!(snapshot.tabs.is_none());
        assert!(snapshot.properties().is_empty());
    }

    #[test]
    fn missing_property_fields_take_defaults() {
        let snapshot: DocTypeSnapshot =
            from_slice(br#"{"GenericProperties": [{"Alias": "title"}]}"#).unwrap();
        let property = snapshot.property("title").unwrap();

        assert!(!property.mandatory);
        assert_eq!(property.validation, "");
        assert_eq!(property.sort_order, None);
        assert_eq!(property.tab_name(), None);
    }

    #[test]
    fn uses_pascal_case_section_names() {
        let snapshot = DocTypeSnapshot {
            info: Some(DocTypeInfo {
                name: Some("Home".into()),
                allow_at_root: true,
                ..Default::default()
            }),
            structure: Some(Structure {
                document_types: vec!["page".into()],
            }),
            generic_properties: Some(vec![GenericProperty {
                alias: "title".into(),
                data_type: "Umbraco.Textbox".into(),
                ..Default::default()
            }]),
            tabs: Some(vec![]),
            hash: None,
        };
        let text = String::from_utf8(to_canonical_bytes(&snapshot).unwrap()).unwrap();

        for key in [
            "\"Info\"",
            "\"AllowAtRoot\"",
            "\"Structure\"",
            "\"DocumentType\"",
            "\"GenericProperties\"",
            "\"Type\"",
            "\"Tabs\"",
        ] {
            assert!(text.contains(key), "missing {key} in {text}");
        }
        assert!(!text.contains("\"Hash\""));
    }

    #[test]
    fn empty_tab_caption_reads_as_no_tab() {
        let property = GenericProperty {
            tab: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(property.tab_name(), None);
    }
}
