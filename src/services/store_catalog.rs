use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::models::store::Store;

/// Read-only store master data, loaded once at startup.
///
/// The catalog is never mutated after load, so lookups need no locking.
#[derive(Debug, Default)]
pub struct StoreCatalog {
    stores: HashMap<String, Store>,
}

impl StoreCatalog {
    /// Load the catalog from a JSON array of store records.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path.as_ref())?;
        let stores: Vec<Store> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::from_stores(stores))
    }

    pub fn from_stores(stores: impl IntoIterator<Item = Store>) -> Self {
        Self {
            stores: stores
                .into_iter()
                .map(|store| (store.store_id.clone(), store))
                .collect(),
        }
    }

    pub fn contains(&self, store_id: &str) -> bool {
        self.stores.contains_key(store_id)
    }

    pub fn get(&self, store_id: &str) -> Option<&Store> {
        self.stores.get(store_id)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read store master file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse store master file: {0}")]
    Parse(#[from] serde_json::Error),
}
