//! Content fingerprints for snapshots
//!
//! A fingerprint is a SHA-256 digest over the canonical bytes of a snapshot,
//! rendered in the canonical `sha256:<hex>` form. Identifiers that differ
//! between installs (pre-value ids, tab ids, dictionary value ids) can be
//! blanked before hashing through an [`ExclusionPolicy`], so two snapshots
//! that only disagree on those fields produce the same fingerprint.

use crate::canonical::{to_tree, tree_to_bytes};
use crate::{Error, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Prefix for all fingerprints produced by this module
const PREFIX: &str = "sha256:";

/// Name of the field a snapshot embeds its own fingerprint in
pub const HASH_FIELD: &str = "Hash";

/// A content digest in the canonical `sha256:<hex>` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{}{:x}", PREFIX, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest without the algorithm prefix.
    pub fn hex(&self) -> &str {
        &self.0[PREFIX.len()..]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let valid = s
            .strip_prefix(PREFIX)
            .is_some_and(|hex| hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()));
        if valid {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidFingerprint {
                value: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

/// Paths of fields whose values are blanked before hashing.
///
/// A path is a dotted list of field names (`"PreValues.Id"`). Whenever a
/// segment resolves to an array, the rest of the path is applied to every
/// element of that array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    paths: Vec<String>,
}

impl ExclusionPolicy {
    /// A policy that excludes nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Blank every matched field in `tree`, in place.
    pub fn apply(&self, tree: &mut Value) {
        for path in &self.paths {
            let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
            blank(tree, &segments);
        }
    }
}

fn blank(value: &mut Value, segments: &[&str]) {
    match value {
        Value::Array(items) => {
            for item in items {
                blank(item, segments);
            }
        }
        Value::Object(map) => match segments {
            [] => {}
            [field] => {
                map.insert((*field).to_string(), Value::String(String::new()));
            }
            [head, rest @ ..] => {
                if let Some(child) = map.get_mut(*head) {
                    blank(child, rest);
                }
            }
        },
        _ => {}
    }
}

/// A snapshot shape that knows which of its fields are install-specific and
/// where it keeps its embedded fingerprint.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// Fields blanked when fingerprints are computed with id exclusion.
    fn exclusion_policy() -> ExclusionPolicy;

    /// The fingerprint embedded in the snapshot, as written.
    fn embedded_hash(&self) -> Option<&str>;

    fn set_embedded_hash(&mut self, hash: Option<String>);
}

/// Fingerprint of a snapshot's canonical bytes.
pub fn hash<T: Serialize + ?Sized>(snapshot: &T) -> Result<Fingerprint> {
    hash_tree(&to_tree(snapshot)?)
}

/// Fingerprint of a snapshot after blanking every field the policy matches.
///
/// Works on a copy; the caller's snapshot is never modified.
pub fn hash_excluding<T: Serialize + ?Sized>(
    snapshot: &T,
    policy: &ExclusionPolicy,
) -> Result<Fingerprint> {
    let mut tree = to_tree(snapshot)?;
    policy.apply(&mut tree);
    hash_tree(&tree)
}

/// The fingerprint embedded in a snapshot, if any.
///
/// Nothing is recomputed. An embedded value that is not a well-formed
/// fingerprint reads as absent.
pub fn stored_hash<T: Snapshot>(snapshot: &T) -> Option<Fingerprint> {
    snapshot.embedded_hash().and_then(|hash| hash.parse().ok())
}

/// Recompute a snapshot's fingerprint with its embedded hash removed.
///
/// When `exclude_ids` is set the shape's [`Snapshot::exclusion_policy`] is
/// applied as well.
pub fn recompute<T: Snapshot>(snapshot: &T, exclude_ids: bool) -> Result<Fingerprint> {
    let mut tree = to_tree(snapshot)?;
    if let Value::Object(map) = &mut tree {
        map.retain(|key, _| key != HASH_FIELD);
    }
    if exclude_ids {
        T::exclusion_policy().apply(&mut tree);
    }
    hash_tree(&tree)
}

/// Fingerprint of an arbitrary string.
pub fn hash_str(input: &str) -> Fingerprint {
    Fingerprint::of_bytes(input.as_bytes())
}

fn hash_tree(tree: &Value) -> Result<Fingerprint> {
    Ok(Fingerprint::of_bytes(&tree_to_bytes(tree)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data_type(pre_value_ids: [i64; 2]) -> Value {
        json!({
            "Name": "Colour picker",
            "PreValues": [
                {"Id": pre_value_ids[0], "Alias": "red", "Value": "#f00"},
                {"Id": pre_value_ids[1], "Alias": "blue", "Value": "#00f"}
            ]
        })
    }

    #[test]
    fn fingerprint_has_prefix_and_fixed_length() {
        let fingerprint = hash(&json!({"a": 1})).unwrap();
        assert!(fingerprint.as_str().starts_with("sha256:"));
        assert_eq!(fingerprint.hex().len(), 64);
    }

    #[test]
    fn hash_str_known_value() {
        assert_eq!(
            hash_str("hello world").as_str(),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let a = hash(&data_type([1, 2])).unwrap();
        let b = hash(&data_type([1, 2])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_leaf_change_changes_hash() {
        let mut changed = data_type([1, 2]);
        changed["PreValues"][1]["Value"] = json!("#00e");
        assert_ne!(hash(&data_type([1, 2])).unwrap(), hash(&changed).unwrap());
    }

    #[test]
    fn excluded_ids_hash_identically() {
        let policy = ExclusionPolicy::new(["PreValues.Id"]);
        let a = data_type([1, 2]);
        let b = data_type([17, 42]);

        assert_eq!(
            hash_excluding(&a, &policy).unwrap(),
            hash_excluding(&b, &policy).unwrap()
        );
        assert_ne!(hash(&a).unwrap(), hash(&b).unwrap());
    }

    #[test]
    fn hash_excluding_leaves_caller_untouched() {
        let policy = ExclusionPolicy::new(["PreValues.Id"]);
        let original = data_type([1, 2]);
        let copy = original.clone();

        hash_excluding(&original, &policy).unwrap();
        assert_eq!(original, copy);
    }

    #[test]
    fn empty_policy_matches_plain_hash() {
        let tree = data_type([1, 2]);
        assert_eq!(
            hash_excluding(&tree, &ExclusionPolicy::none()).unwrap(),
            hash(&tree).unwrap()
        );
    }

    #[test]
    fn apply_ignores_missing_parents() {
        let mut tree = json!({"Name": "x"});
        ExclusionPolicy::new(["PreValues.Id"]).apply(&mut tree);
        assert_eq!(tree, json!({"Name": "x"}));
    }

    #[test]
    fn apply_blanks_top_level_field() {
        let mut tree = json!({"Id": 7, "Name": "x"});
        ExclusionPolicy::none().with_path("Id").apply(&mut tree);
        assert_eq!(tree, json!({"Id": "", "Name": "x"}));
    }

    #[test]
    fn parse_rejects_malformed_fingerprints() {
        assert!("sha256:abc".parse::<Fingerprint>().is_err());
        assert!("d41d8cd98f00b204e9800998ecf8427e".parse::<Fingerprint>().is_err());
        let valid = hash_str("x");
        assert_eq!(valid.as_str().parse::<Fingerprint>().unwrap(), valid);
    }

    #[test]
    fn fingerprint_serde_uses_plain_string() {
        let fingerprint = hash_str("x");
        let json = serde_json::to_string(&fingerprint).unwrap();
        assert_eq!(json, format!("\"{}\"", fingerprint));
        let parsed: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fingerprint);
    }
}
