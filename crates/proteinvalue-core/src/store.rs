use chrono::Utc;
use tracing::{debug, info};

use crate::favorites::FavoriteSet;
use crate::models::{Product, ProductDraft};
use crate::persist::{self, BlobStore};
use crate::valuation::Valuation;
use crate::{Error, Result, ValidationError};

/// Authoritative in-memory product collection plus its favorite overlay.
///
/// The single admission and mutation gateway: nothing enters the collection
/// without passing validation, and every mutation rewrites the persisted
/// blobs in full before returning.
pub struct ProductStore {
    blobs: Box<dyn BlobStore>,
    products: Vec<Product>,
    favorites: FavoriteSet,
    last_id: i64,
}

impl ProductStore {
    /// Load both blobs and reconcile: favorites referencing products that no
    /// longer exist are pruned right away.
    pub fn open(blobs: Box<dyn BlobStore>) -> Self {
        let products = persist::load_products(blobs.as_ref());
        let mut favorites = persist::load_favorites(blobs.as_ref());

        let dropped = favorites.prune(products.iter().map(|p| p.id));
        if dropped > 0 {
            debug!("Pruned {} dangling favorite id(s) at load", dropped);
            // Best effort - if the write fails we still start up, and the
            // next successful mutation persists the pruned set anyway.
            if let Err(e) = persist::save_favorites(blobs.as_ref(), &favorites) {
                tracing::warn!("Could not persist pruned favorites: {}", e);
            }
        }

        let last_id = products.iter().map(|p| p.id).max().unwrap_or(0);
        info!("Loaded {} product(s), {} favorite(s)", products.len(), favorites.len());

        Self {
            blobs,
            products,
            favorites,
            last_id,
        }
    }

    /// Validate and admit a candidate. On success the stored product (with
    /// id, timestamps, and derived metrics filled in) is returned.
    pub fn add(&mut self, draft: ProductDraft) -> Result<Product> {
        validate(&draft)?;

        let total_protein = draft.amount.total_grams();
        let product = self.materialize(self.next_id(), draft, total_protein);

        self.products.push(product.clone());
        self.last_id = product.id;
        self.persist_products()?;
        info!("Added product {} ({})", product.id, product.name);
        Ok(product)
    }

    /// Replace the record at `id` with a re-validated candidate, preserving
    /// identity and creation time.
    pub fn update(&mut self, id: i64, draft: ProductDraft) -> Result<Product> {
        validate(&draft)?;

        let idx = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(Error::NotFound(id))?;

        let total_protein = draft.amount.total_grams();
        let mut updated = self.materialize(id, draft, total_protein);
        updated.created_at = self.products[idx].created_at;
        updated.updated_at = Some(Utc::now());

        self.products[idx] = updated.clone();
        self.persist_products()?;
        info!("Updated product {} ({})", updated.id, updated.name);
        Ok(updated)
    }

    /// Delete by id. Removing an absent id is a no-op, not an error. A real
    /// removal cascades into the favorite set so no dangling id survives.
    pub fn remove(&mut self, id: i64) -> Result<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        if self.products.len() == before {
            debug!("Remove of absent product {} ignored", id);
            return Ok(());
        }

        if self.favorites.remove(id) {
            self.persist_favorites()?;
        }
        self.persist_products()?;
        info!("Removed product {}", id);
        Ok(())
    }

    /// Empty the collection and the favorite set together. Irreversible;
    /// asking the user first is the caller's job.
    pub fn clear(&mut self) -> Result<()> {
        self.products.clear();
        self.favorites.clear();
        self.persist_products()?;
        self.persist_favorites()?;
        info!("Cleared all products and favorites");
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Flip favorite status for an existing product. Returns whether the
    /// product is a favorite afterwards; ids with no matching product are a
    /// no-op returning false.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<bool> {
        if self.find_by_id(id).is_none() {
            debug!("Favorite toggle for unknown product {} ignored", id);
            return Ok(false);
        }
        let now_favorite = self.favorites.toggle(id);
        self.persist_favorites()?;
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.favorites.contains(id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Ids are wall-clock milliseconds like the persisted history expects,
    /// nudged past the last assigned id so several admissions inside one
    /// millisecond still get distinct ids.
    fn next_id(&self) -> i64 {
        Utc::now().timestamp_millis().max(self.last_id + 1)
    }

    fn materialize(&self, id: i64, draft: ProductDraft, total_protein: f64) -> Product {
        let valuation = Valuation::compute(total_protein, draft.price);
        let (servings, protein_per_serving) = match draft.amount {
            crate::models::ProteinAmount::PerServing {
                servings,
                grams_each,
            } => (Some(servings), Some(grams_each)),
            crate::models::ProteinAmount::Total { .. } => (None, None),
        };

        Product {
            id,
            name: draft.name.trim().to_string(),
            brand: draft.brand,
            notes: draft.notes,
            barcode: draft.barcode,
            store: draft.store,
            source: draft.source,
            price: draft.price,
            servings,
            protein_per_serving,
            total_protein,
            cost_per_gram: valuation.cost_per_gram,
            protein_per_dollar: valuation.protein_per_dollar,
            created_at: Utc::now(),
            updated_at: None,
            contribute_data: draft.contribute_data,
            photos: draft.photos,
        }
    }

    fn persist_products(&self) -> Result<()> {
        persist::save_products(self.blobs.as_ref(), &self.products)
    }

    fn persist_favorites(&self) -> Result<()> {
        persist::save_favorites(self.blobs.as_ref(), &self.favorites)
    }
}

/// Admission checks in fixed priority order: name, source, price, protein.
/// Only the first failing field is reported.
fn validate(draft: &ProductDraft) -> std::result::Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::Name);
    }
    if draft.source.trim().is_empty() {
        return Err(ValidationError::Source);
    }
    if !draft.price.is_finite() || draft.price <= 0.0 {
        return Err(ValidationError::Price);
    }
    let total = draft.amount.total_grams();
    if !total.is_finite() || total <= 0.0 {
        return Err(ValidationError::Protein);
    }
    Ok(())
}
