//! # Collection models
//!
//! Plain data structures shared by the loader, the search runner and the
//! console formatting code.
//!
//! - [`StoredItem`]: one record of the collection (id, document text, metadata).
//! - [`MetadataValue`]: a scalar metadata value (string, integer, float, bool).
//! - [`QueryHit`] / [`QueryResult`]: ranked search output, closest first.
//!
//! Stored items are produced by the external build step and are read-only here.
//! Metadata keys are kept under the Korean column names the build step writes;
//! the constants in [`keys`] name the ones the report prints.
//!
//! ```rust
//! use policy_probe::models::{keys, Metadata, MetadataValue, StoredItem};
//!
//! let mut metadata = Metadata::new();
//! metadata.insert(keys::POLICY_NAME.into(), MetadataValue::from("청년 취업 지원"));
//! metadata.insert(keys::MIN_AGE.into(), MetadataValue::Int(19));
//!
//! let item = StoredItem {
//!     id: "policy-1".into(),
//!     document: "취업 준비 청년에게 교육비를 지원합니다.".into(),
//!     metadata,
//! };
//! assert_eq!(item.field_or(keys::MIN_AGE, "0"), "19");
//! assert_eq!(item.field_or(keys::URL, "N/A"), "N/A");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata keys written by the collection build step.
pub mod keys {
    pub const POLICY_NAME: &str = "정책명";
    pub const CATEGORY: &str = "중분류";
    pub const ORGANIZATION: &str = "주관기관명";
    pub const MIN_AGE: &str = "지원최소연령";
    pub const MAX_AGE: &str = "지원최대연령";
    pub const MIN_AMOUNT: &str = "최소지원금액";
    pub const MAX_AMOUNT: &str = "최대지원금액";
    pub const APPLICATION_PERIOD: &str = "신청기간";
    pub const URL: &str = "신청URL";
}

/// A scalar metadata value.
///
/// Deserialized untagged, so YAML `19`, `19.5`, `true` and `"text"` all map onto
/// the natural variant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Int(i) => write!(f, "{i}"),
            MetadataValue::Float(x) => write!(f, "{x}"),
            MetadataValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Str(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

/// Metadata attached to a stored item. Ordered so output is stable.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Looks up `key` and renders it, or returns `default` when it is missing.
pub fn metadata_field(metadata: &Metadata, key: &str, default: &str) -> String {
    metadata
        .get(key)
        .map(ToString::to_string)
        .unwrap_or_else(|| default.to_string())
}

/// One record of a collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredItem {
    /// Identifier assigned by the build step.
    pub id: String,
    /// Full document text that was embedded.
    pub document: String,
    /// Scalar metadata keyed by column name.
    #[serde(default)]
    pub metadata: Metadata,
}

impl StoredItem {
    /// Renders metadata field `key`, falling back to `default`.
    pub fn field_or(&self, key: &str, default: &str) -> String {
        metadata_field(&self.metadata, key, default)
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
    /// Distance to the query embedding, lower is closer. `None` when the
    /// backend did not report one.
    pub distance: Option<f32>,
}

impl QueryHit {
    /// Renders metadata field `key`, falling back to `default`.
    pub fn field_or(&self, key: &str, default: &str) -> String {
        metadata_field(&self.metadata, key, default)
    }

    /// Distance used for display; a missing distance shows as `0`.
    pub fn display_distance(&self) -> f32 {
        self.distance.unwrap_or(0.0)
    }
}

/// Hits ordered by ascending distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub hits: Vec<QueryHit>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
