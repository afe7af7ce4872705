use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::valuation::total_from_per_serving;

/// Product model - one priced-out protein item, the star of the show
///
/// Derived metrics are computed once at admission (and again on edit) and
/// stored on the record; readers never recompute them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    /// Key into the store catalog, when the user recorded where they shopped
    #[serde(default)]
    pub store: Option<String>,
    /// Key into the protein source catalog; unknown keys fall back at render
    pub source: String,
    pub price: f64,
    /// Kept when the per-serving input shape was used, for display
    #[serde(default)]
    pub servings: Option<f64>,
    #[serde(default)]
    pub protein_per_serving: Option<f64>,
    pub total_protein: f64,
    pub cost_per_gram: f64,
    pub protein_per_dollar: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Opt-in for anonymized price sharing
    #[serde(default)]
    pub contribute_data: bool,
    /// Session-only image payloads; never serialized, may be large
    #[serde(skip)]
    pub photos: Vec<Photo>,
}

impl Product {
    /// Rebuild the editable draft for this record. Used by edit flows so a
    /// partial edit re-runs the same admission path as a fresh add.
    pub fn to_draft(&self) -> ProductDraft {
        let amount = match (self.servings, self.protein_per_serving) {
            (Some(servings), Some(grams_each)) => ProteinAmount::PerServing {
                servings,
                grams_each,
            },
            _ => ProteinAmount::Total {
                grams: self.total_protein,
            },
        };

        ProductDraft {
            name: self.name.clone(),
            brand: self.brand.clone(),
            notes: self.notes.clone(),
            barcode: self.barcode.clone(),
            store: self.store.clone(),
            source: self.source.clone(),
            price: self.price,
            amount,
            contribute_data: self.contribute_data,
            photos: self.photos.clone(),
        }
    }
}

/// A captured product or label shot. Transient by design - photos live only
/// in the session that captured them.
#[derive(Debug, Clone)]
pub struct Photo {
    pub kind: PhotoKind,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    Product,
    Label,
}

/// Candidate product as entered by the user, before admission checks.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub brand: Option<String>,
    pub notes: Option<String>,
    pub barcode: Option<String>,
    pub store: Option<String>,
    pub source: String,
    pub price: f64,
    pub amount: ProteinAmount,
    pub contribute_data: bool,
    pub photos: Vec<Photo>,
}

impl ProductDraft {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        price: f64,
        amount: ProteinAmount,
    ) -> Self {
        Self {
            name: name.into(),
            brand: None,
            notes: None,
            barcode: None,
            store: None,
            source: source.into(),
            price,
            amount,
            contribute_data: false,
            photos: Vec::new(),
        }
    }
}

/// The two input shapes for protein quantity.
///
/// Normalized exactly once (via `total_grams`) before validation and
/// valuation, so the rest of the engine only ever sees a canonical total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProteinAmount {
    PerServing { servings: f64, grams_each: f64 },
    Total { grams: f64 },
}

impl ProteinAmount {
    /// Canonical total grams of protein for this entry.
    pub fn total_grams(&self) -> f64 {
        match *self {
            ProteinAmount::PerServing {
                servings,
                grams_each,
            } => total_from_per_serving(servings, grams_each),
            ProteinAmount::Total { grams } => grams,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_serving_shape_normalizes_to_product() {
        let amount = ProteinAmount::PerServing {
            servings: 30.0,
            grams_each: 24.0,
        };
        assert_eq!(amount.total_grams(), 720.0);
    }

    #[test]
    fn total_shape_passes_through() {
        let amount = ProteinAmount::Total { grams: 400.0 };
        assert_eq!(amount.total_grams(), 400.0);
    }

    #[test]
    fn draft_round_trips_per_serving_fields() {
        let product = Product {
            id: 1,
            name: "Whey X".into(),
            brand: None,
            notes: None,
            barcode: None,
            store: None,
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
            photos: Vec::new(),
        };

        let draft = product.to_draft();
        assert_eq!(
            draft.amount,
            ProteinAmount::PerServing {
                servings: 30.0,
                grams_each: 24.0
            }
        );
        assert_eq!(draft.amount.total_grams(), 720.0);
    }
}
