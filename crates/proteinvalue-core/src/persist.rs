use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

use crate::favorites::FavoriteSet;
use crate::models::Product;
use crate::{Error, Result};

/// Storage key for the product collection blob.
pub const PRODUCTS_KEY: &str = "products";
/// Storage key for the favorite id set, persisted independently.
pub const FAVORITES_KEY: &str = "favorites";

/// A dumb keyed blob store: get/set JSON strings, nothing else.
///
/// Durability and schema tolerance are the adapter functions' concern, not
/// the store's. Trait so tests can run against memory instead of disk.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key under the app data directory.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default location: `<data_dir>/proteinvalue/` (XDG on Unix, AppData on
    /// Windows).
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| Error::Config("Could not find data directory".into()))?
            .join("proteinvalue");
        Ok(Self::new(dir))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| Error::Storage("blob store lock poisoned".into()))?;
        Ok(blobs.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| Error::Storage("blob store lock poisoned".into()))?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write the full product collection. Photos are `#[serde(skip)]` on the
/// model, so the persisted form never contains image payloads.
pub fn save_products(blobs: &dyn BlobStore, products: &[Product]) -> Result<()> {
    let json = serde_json::to_string_pretty(products)?;
    blobs.set(PRODUCTS_KEY, &json)
}

/// Read the product collection. Missing key or a corrupt blob yields an
/// empty collection - startup must never fail on bad stored data.
pub fn load_products(blobs: &dyn BlobStore) -> Vec<Product> {
    match blobs.get(PRODUCTS_KEY) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(products) => products,
            Err(e) => {
                warn!("Stored products are corrupt, starting empty: {}", e);
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Could not read stored products, starting empty: {}", e);
            Vec::new()
        }
    }
}

pub fn save_favorites(blobs: &dyn BlobStore, favorites: &FavoriteSet) -> Result<()> {
    let json = serde_json::to_string(favorites)?;
    blobs.set(FAVORITES_KEY, &json)
}

/// Same load-failure tolerance as products: corruption means an empty set.
pub fn load_favorites(blobs: &dyn BlobStore) -> FavoriteSet {
    match blobs.get(FAVORITES_KEY) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(favorites) => favorites,
            Err(e) => {
                warn!("Stored favorites are corrupt, starting empty: {}", e);
                FavoriteSet::new()
            }
        },
        Ok(None) => FavoriteSet::new(),
        Err(e) => {
            warn!("Could not read stored favorites, starting empty: {}", e);
            FavoriteSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Photo, PhotoKind};
    use chrono::Utc;

    fn sample_product(id: i64) -> Product {
        Product {
            id,
            name: "Whey X".into(),
            brand: Some("Acme".into()),
            notes: None,
            barcode: None,
            store: Some("costco".into()),
            source: "whey".into(),
            price: 30.0,
            servings: Some(30.0),
            protein_per_serving: Some(24.0),
            total_protein: 720.0,
            cost_per_gram: 30.0 / 720.0,
            protein_per_dollar: 24.0,
            created_at: Utc::now(),
            updated_at: None,
            contribute_data: false,
            photos: vec![Photo {
                kind: PhotoKind::Label,
                bytes: vec![0xFF; 4096],
            }],
        }
    }

    #[test]
    fn round_trip_strips_photos() {
        let blobs = MemoryBlobStore::new();
        save_products(&blobs, &[sample_product(1)]).unwrap();

        let raw = blobs.get(PRODUCTS_KEY).unwrap().unwrap();
        assert!(!raw.contains("photos"));

        let loaded = load_products(&blobs);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Whey X");
        assert_eq!(loaded[0].total_protein, 720.0);
        assert!(loaded[0].photos.is_empty());
    }

    #[test]
    fn corrupt_blob_loads_as_empty() {
        let blobs = MemoryBlobStore::new();
        blobs.set(PRODUCTS_KEY, "{not json at all").unwrap();
        blobs.set(FAVORITES_KEY, "[1, 2,").unwrap();

        assert!(load_products(&blobs).is_empty());
        assert!(load_favorites(&blobs).is_empty());
    }

    #[test]
    fn missing_keys_load_as_empty() {
        let blobs = MemoryBlobStore::new();
        assert!(load_products(&blobs).is_empty());
        assert!(load_favorites(&blobs).is_empty());
    }

    #[test]
    fn tolerates_records_missing_optional_fields() {
        // A blob written by an older build without brand/store/updated_at
        let blobs = MemoryBlobStore::new();
        blobs
            .set(
                PRODUCTS_KEY,
                r#"[{
                    "id": 5,
                    "name": "Pea Y",
                    "source": "pea",
                    "price": 20.0,
                    "total_protein": 400.0,
                    "cost_per_gram": 0.05,
                    "protein_per_dollar": 20.0,
                    "created_at": "2025-11-02T10:00:00Z"
                }]"#,
            )
            .unwrap();

        let loaded = load_products(&blobs);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].brand, None);
        assert!(!loaded[0].contribute_data);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FileBlobStore::new(dir.path().join("proteinvalue"));

        assert!(blobs.get(PRODUCTS_KEY).unwrap().is_none());
        save_products(&blobs, &[sample_product(2)]).unwrap();
        let loaded = load_products(&blobs);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 2);
    }
}
