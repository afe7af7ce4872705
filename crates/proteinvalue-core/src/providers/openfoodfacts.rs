// Open Food Facts provider - bridges the HTTP client with the BarcodeProvider trait
use async_trait::async_trait;
use proteinvalue_lookup::{BarcodeClient, OffProduct};

use crate::lookup::{BarcodeHit, BarcodeProvider};
use crate::{Error, Result};

/// Wrapper around `BarcodeClient` that speaks the engine's trait.
pub struct OpenFoodFactsProvider {
    client: BarcodeClient,
}

impl OpenFoodFactsProvider {
    pub fn new() -> Self {
        Self {
            client: BarcodeClient::new(),
        }
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: BarcodeClient::with_base_url(base_url),
        }
    }
}

impl Default for OpenFoodFactsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BarcodeProvider for OpenFoodFactsProvider {
    async fn lookup(&self, barcode: &str) -> Result<Option<BarcodeHit>> {
        let found = self
            .client
            .fetch_product(barcode)
            .await
            .map_err(|e| Error::Lookup(e.to_string()))?;

        Ok(found.map(|p| off_to_hit(barcode, p)))
    }
}

/// Convert an OFF record to the engine's barcode hit. Entries without a
/// usable name fall back to the raw code so the caller always has something
/// to show.
fn off_to_hit(barcode: &str, product: OffProduct) -> BarcodeHit {
    let protein_per_serving = product.protein_per_serving();
    BarcodeHit {
        barcode: if product.code.is_empty() {
            barcode.to_string()
        } else {
            product.code.clone()
        },
        name: product
            .product_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| barcode.to_string()),
        brand: product.brands,
        protein_per_serving,
        serving_size: product.serving_size,
    }
}
