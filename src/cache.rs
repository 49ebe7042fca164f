//! Dataset cache
//!
//! Indexed datasets saved as JSON next to the checksum of the source they came
//! from. A host can skip loading and indexing while the source is unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tracing::{debug, info};

use crate::checksum::Checksum;
use crate::error::{CatalogError, Result};
use crate::index::IndexedCatalog;

/// Cached datasets for one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCache {
    pub source_checksum: Checksum,
    pub generated_at: DateTime<Utc>,
    pub datasets: IndexedCatalog,
}

impl DatasetCache {
    pub fn new(source_checksum: Checksum, datasets: IndexedCatalog) -> Self {
        Self {
            source_checksum,
            generated_at: Utc::now(),
            datasets,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), checksum = %self.source_checksum, "Wrote dataset cache");
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CatalogError::Cache(format!("{}: {}", path.display(), e)))
    }

    /// The cached datasets, if the cache exists and was built from `checksum`
    pub fn read_fresh(path: &Path, checksum: &Checksum) -> Result<Option<IndexedCatalog>> {
        if !path.exists() {
            debug!(path = %path.display(), "No dataset cache");
            return Ok(None);
        }
        let cache = Self::read(path)?;
        if cache.source_checksum != *checksum {
            debug!(
                path = %path.display(),
                cached = %cache.source_checksum,
                current = %checksum,
                "Dataset cache is stale"
            );
            return Ok(None);
        }
        debug!(path = %path.display(), generated_at = %cache.generated_at, "Using dataset cache");
        let mut datasets = cache.datasets;
        datasets.restore_lookup();
        Ok(Some(datasets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VersionEntry;
    use crate::index::index_entries;

    #[test]
    fn test_fresh_cache_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datasets.cache.json");
        let checksum = Checksum::of_text("<BibleVersionCodes/>");
        let datasets = index_entries(&[VersionEntry::new("KJV", "King James Version", "en")]);

        DatasetCache::new(checksum.clone(), datasets.clone()).write(&path).unwrap();

        let cached = DatasetCache::read_fresh(&path, &checksum).unwrap().unwrap();
        assert_eq!(cached.abbreviation_list, datasets.abbreviation_list);
        assert_eq!(cached.language_index, datasets.language_index);
        assert_eq!(cached.abbreviation_lookup.resolve("KJV"), Some("KJV"));
    }

    #[test]
    fn test_stale_or_missing_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datasets.cache.json");
        let checksum = Checksum::of_text("old");

        assert!(DatasetCache::read_fresh(&path, &checksum).unwrap().is_none());

        DatasetCache::new(checksum, IndexedCatalog::default()).write(&path).unwrap();
        let newer = Checksum::of_text("new");
        assert!(DatasetCache::read_fresh(&path, &newer).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datasets.cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = DatasetCache::read_fresh(&path, &Checksum::of_text("x")).unwrap_err();
        assert!(matches!(err, CatalogError::Cache(_)));
    }
}
