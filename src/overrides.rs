//! Relationship override documents.
//!
//! An override document maps entity names to the relationships they declare:
//!
//! ```json
//! {
//!   "Product": [
//!     { "target": "Category", "type": "many-to-one", "fieldName": "category" }
//!   ]
//! }
//! ```
//!
//! Unknown keys are ignored. Unknown `type` values reject the document;
//! malformed pass-through settings (`fetch`, `cascade`, ...) are dropped.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
    #[default]
    OneToMany,
    ManyToMany,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one-to-one",
            Self::ManyToOne => "many-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FetchType {
    Lazy,
    Eager,
}

impl FromStr for FetchType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("lazy") {
            Ok(Self::Lazy)
        } else if s.eq_ignore_ascii_case("eager") {
            Ok(Self::Eager)
        } else {
            Err(())
        }
    }
}

/// One declared relationship of a source entity.
///
/// Only `target`, `type` and `fieldName` drive mapping. The remaining fields
/// are carried through to templates, and a value of the wrong shape is read
/// as absent rather than failing the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipOverride {
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub bidirectional: Option<bool>,
    #[serde(default, deserialize_with = "lenient_cascade", skip_serializing_if = "Option::is_none")]
    pub cascade: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_fetch", skip_serializing_if = "Option::is_none")]
    pub fetch: Option<FetchType>,
    #[serde(default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => s.trim().to_ascii_lowercase().parse().ok(),
        _ => None,
    })
}

/// `"ALL"` and `["PERSIST", "MERGE"]` are both accepted.
fn lenient_cascade<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(vec![s]),
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_fetch<'de, D>(deserializer: D) -> std::result::Result<Option<FetchType>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}

impl RelationshipOverride {
    pub fn new(target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            target: target.into(),
            kind,
            field_name: None,
            bidirectional: None,
            cascade: None,
            fetch: None,
            optional: None,
        }
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = Some(bidirectional);
        self
    }
}

/// Entity name -> declared relationships, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideDocument {
    entities: IndexMap<String, Vec<RelationshipOverride>>,
}

impl OverrideDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict parse. Malformed JSON or an unknown relationship type is an
    /// error.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Load a document, treating any failure as "no overrides".
    pub fn load_or_empty(path: impl AsRef<Path>, diagnostics: &mut Diagnostics) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(document) => {
                tracing::info!(path = %path.display(), entities = document.len(), "loaded relationship overrides");
                document
            }
            Err(err) => {
                diagnostics.warn(
                    DiagnosticKind::MalformedOverrides,
                    format!("ignoring relationship overrides: {}", err),
                );
                Self::default()
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote relationship template");
        Ok(())
    }

    pub fn get(&self, entity: &str) -> Option<&[RelationshipOverride]> {
        self.entities.get(entity).map(Vec::as_slice)
    }

    pub fn insert(&mut self, entity: impl Into<String>, relationships: Vec<RelationshipOverride>) {
        self.entities.insert(entity.into(), relationships);
    }

    pub fn push(&mut self, entity: &str, relationship: RelationshipOverride) {
        match self.entities.get_mut(entity) {
            Some(relationships) => relationships.push(relationship),
            None => {
                self.entities.insert(entity.to_string(), vec![relationship]);
            }
        }
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RelationshipOverride])> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
