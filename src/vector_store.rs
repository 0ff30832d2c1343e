//! # VectorStore
//!
//! Read-only access to a persisted embedding collection.
//!
//! A store is a directory; each collection inside it is a sub-directory holding a
//! YAML manifest and a [HNSW](https://arxiv.org/abs/1603.09320) index dump
//! (`hora` crate). The manifest carries the stored items in insertion order and
//! the HNSW node ids are positions into that list.
//!
//! ```text
//! data/vectordb/
//! └── youth_policies/
//!     ├── collection.yaml     # name, dimension, embedding_model, items
//!     └── hnsw_index.bin      # hora HNSW dump (absent for empty collections)
//! ```
//!
//! The collection is produced by a separate build step; this module never writes
//! it outside of tests.
//!
//! ## Quick Example
//! ```no_run
//! use policy_probe::vector_store::Collection;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let collection = Collection::open(Path::new("data/vectordb"), "youth_policies")?;
//! println!("{} items", collection.count());
//! for item in collection.peek(3) {
//!     println!("{}", item.id);
//! }
//! # Ok(()) }
//! ```

use hora::core::ann_index::{ANNIndex, SerializableIndex};
use hora::core::node::Node;
use hora::index::hnsw_idx::HNSWIndex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{QueryHit, QueryResult, StoredItem};

/// Manifest file name inside a collection directory.
pub const MANIFEST_FILE: &str = "collection.yaml";
/// HNSW dump file name inside a collection directory.
pub const INDEX_FILE: &str = "hnsw_index.bin";

/// Why a collection could not be opened.
#[derive(Debug)]
pub enum OpenError {
    /// The store directory itself does not exist.
    MissingStore(PathBuf),
    /// The store exists but the named collection cannot be read.
    MissingCollection {
        name: String,
        reason: Box<dyn Error>,
    },
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::MissingStore(path) => {
                write!(f, "store directory not found: {}", path.display())
            }
            OpenError::MissingCollection { name, reason } => {
                write!(f, "collection {name:?} could not be opened: {reason}")
            }
        }
    }
}

impl Error for OpenError {}

/// On-disk manifest of one collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CollectionManifest {
    pub name: String,
    /// Length of every stored embedding.
    pub dimension: usize,
    /// Model the build step embedded documents with, if recorded.
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default)]
    pub items: Vec<StoredItem>,
}

/// An opened collection handle.
///
/// Holds the manifest and, for non-empty collections, the loaded HNSW index.
pub struct Collection {
    manifest: CollectionManifest,
    index: Option<HNSWIndex<f32, usize>>,
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.manifest.name)
            .field("dimension", &self.manifest.dimension)
            .field("count", &self.manifest.items.len())
            .finish()
    }
}

impl Collection {
    /// Open collection `name` inside the store directory `store`.
    ///
    /// # Errors
    /// - [`OpenError::MissingStore`] if `store` is not a directory.
    /// - [`OpenError::MissingCollection`] if the manifest is missing or invalid,
    ///   or the HNSW dump of a non-empty collection fails to load.
    pub fn open(store: &Path, name: &str) -> Result<Self, OpenError> {
        if !store.is_dir() {
            return Err(OpenError::MissingStore(store.to_path_buf()));
        }

        let dir = store.join(name);
        Self::open_dir(&dir).map_err(|reason| OpenError::MissingCollection {
            name: name.to_string(),
            reason,
        })
    }

    fn open_dir(dir: &Path) -> Result<Self, Box<dyn Error>> {
        let manifest_path = dir.join(MANIFEST_FILE);
        debug!("Reading collection manifest: {}", manifest_path.display());
        let content = fs::read_to_string(&manifest_path)
            .map_err(|e| format!("{}: {e}", manifest_path.display()))?;
        let manifest: CollectionManifest = serde_yaml::from_str(&content)?;

        let index = if manifest.items.is_empty() {
            None
        } else {
            let index_path = dir.join(INDEX_FILE);
            let index_path = index_path
                .to_str()
                .ok_or_else(|| format!("non UTF-8 index path: {}", index_path.display()))?;
            debug!("Loading HNSW index: {}", index_path);
            Some(HNSWIndex::<f32, usize>::load(index_path)?)
        };

        debug!(
            "Opened collection {} ({} items, dimension {})",
            manifest.name,
            manifest.items.len(),
            manifest.dimension
        );

        Ok(Self { manifest, index })
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn dimension(&self) -> usize {
        self.manifest.dimension
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.manifest.embedding_model.as_deref()
    }

    /// Number of stored items.
    pub fn count(&self) -> usize {
        self.manifest.items.len()
    }

    /// Up to `limit` stored items, unranked (storage order).
    pub fn peek(&self, limit: usize) -> &[StoredItem] {
        let end = limit.min(self.manifest.items.len());
        &self.manifest.items[..end]
    }

    /// Query the index for the `top_k` items nearest to `vector`.
    ///
    /// Hits are sorted by ascending distance and never exceed `top_k` or
    /// [`count`](Self::count).
    ///
    /// # Errors
    /// Returns `"dimension mismatch"` if `vector.len() != self.dimension()`.
    pub fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResult, Box<dyn Error>> {
        if vector.len() != self.manifest.dimension {
            return Err(format!(
                "dimension mismatch: query has {}, collection {} expects {}",
                vector.len(),
                self.manifest.name,
                self.manifest.dimension
            )
            .into());
        }

        let Some(index) = self.index.as_ref() else {
            return Ok(QueryResult::default());
        };

        let k = top_k.min(self.count());
        if k == 0 {
            return Ok(QueryResult::default());
        }

        let mut hits: Vec<QueryHit> = index
            .search_nodes(vector, k)
            .into_iter()
            .filter_map(|(node, distance): (Node<f32, usize>, f32)| {
                let position = (*node.idx())?;
                let item = self.manifest.items.get(position)?;
                Some(QueryHit {
                    id: item.id.clone(),
                    document: item.document.clone(),
                    metadata: item.metadata.clone(),
                    distance: Some(distance),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.display_distance().total_cmp(&b.display_distance()));
        hits.truncate(k);

        debug!("Query against {} returned {} hits", self.manifest.name, hits.len());
        Ok(QueryResult { hits })
    }
}

/// Writes collections to disk for tests; the real build step lives elsewhere.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::{Metadata, MetadataValue, keys};
    use hora::core::metrics::Metric;
    use hora::index::hnsw_params::HNSWParams;

    /// Persist `items` with their `vectors` as collection `name` under `store`.
    pub fn write_collection(
        store: &Path,
        name: &str,
        dimension: usize,
        items: Vec<StoredItem>,
        vectors: &[Vec<f32>],
    ) -> Result<(), Box<dyn Error>> {
        let dir = store.join(name);
        fs::create_dir_all(&dir)?;

        if !items.is_empty() {
            let mut index = HNSWIndex::<f32, usize>::new(dimension, &HNSWParams::<f32>::default());
            for (position, vector) in vectors.iter().enumerate() {
                index.add(vector, position)?;
            }
            index.build(Metric::Euclidean)?;
            let index_path = dir.join(INDEX_FILE);
            index.dump(index_path.to_str().ok_or("non UTF-8 path")?)?;
        }

        let manifest = CollectionManifest {
            name: name.to_string(),
            dimension,
            embedding_model: Some("text-embedding-3-small".to_string()),
            items,
        };
        fs::write(dir.join(MANIFEST_FILE), serde_yaml::to_string(&manifest)?)?;
        Ok(())
    }

    /// A policy record with the metadata the report prints.
    pub fn policy(id: &str, name: &str, category: &str, document: &str) -> StoredItem {
        let mut metadata = Metadata::new();
        metadata.insert(keys::POLICY_NAME.into(), MetadataValue::from(name));
        metadata.insert(keys::CATEGORY.into(), MetadataValue::from(category));
        metadata.insert(keys::ORGANIZATION.into(), MetadataValue::from("고용노동부"));
        metadata.insert(keys::MIN_AGE.into(), MetadataValue::Int(19));
        metadata.insert(keys::MAX_AGE.into(), MetadataValue::Int(34));
        metadata.insert(keys::MIN_AMOUNT.into(), MetadataValue::Int(0));
        metadata.insert(keys::MAX_AMOUNT.into(), MetadataValue::Int(3_000_000));
        metadata.insert(keys::APPLICATION_PERIOD.into(), MetadataValue::from("상시"));
        metadata.insert(
            keys::URL.into(),
            MetadataValue::from(format!("https://policy.example.kr/{id}")),
        );
        StoredItem {
            id: id.to_string(),
            document: document.to_string(),
            metadata,
        }
    }

    /// Four policies on the unit axes of a 4-d space.
    pub fn youth_policies(store: &Path) -> Result<(), Box<dyn Error>> {
        let items = vec![
            policy("p-001", "청년 취업 지원", "일자리", "미취업 청년에게 취업 컨설팅과 교육을 제공합니다."),
            policy("p-002", "청년 창업 패키지", "창업", "초기 창업자에게 사업화 자금을 지원합니다."),
            policy("p-003", "청년 월세 지원", "주거", "무주택 청년에게 월세를 지원합니다."),
            policy("p-004", "국민내일배움카드", "교육", "직업 훈련 비용을 바우처로 지원합니다."),
        ];
        let vectors = axis_vectors(4);
        write_collection(store, "youth_policies", 4, items, &vectors)
    }

    /// Unit vectors `e_0 .. e_{n-1}` in `n` dimensions.
    pub fn axis_vectors(n: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| {
                let mut v = vec![0.0; n];
                v[i] = 1.0;
                v
            })
            .collect()
    }
}
