use serde::Deserialize;
use tracing::debug;

use crate::retry::{with_backoff, RetryConfig};
use crate::{LookupError, Result};

const OFF_API_BASE: &str = "https://world.openfoodfacts.org/api/v2";

/// Client for the Open Food Facts product database.
///
/// Anonymous and read-only; the polite thing is a descriptive user agent,
/// which OFF asks for in their API guidelines.
pub struct BarcodeClient {
    client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl BarcodeClient {
    pub fn new() -> Self {
        Self::with_base_url(OFF_API_BASE.to_string())
    }

    /// For self-hosted mirrors or pointing tests at a local server.
    pub fn with_base_url(base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("ProteinValue/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Fetch a product by barcode. `Ok(None)` covers both "unknown code" and
    /// the API's `status: 0` answer; only transport-level trouble is an Err,
    /// and even that the engine downgrades to advisory.
    pub async fn fetch_product(&self, barcode: &str) -> Result<Option<OffProduct>> {
        let url = format!("{}/product/{}.json", self.base_url, barcode.trim());

        with_backoff(&self.retry_config, || async {
            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND {
                debug!("Barcode {} unknown to the database", barcode);
                return Ok(None);
            }
            if !status.is_success() {
                return Err(LookupError::RequestFailed(status.as_u16()));
            }

            let body: OffResponse = response.json().await?;
            if body.status == 0 {
                debug!("Barcode {} present but without product data", barcode);
                return Ok(None);
            }
            Ok(body.product)
        })
        .await
    }
}

impl Default for BarcodeClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Envelope of the OFF v2 product endpoint.
#[derive(Debug, Deserialize)]
struct OffResponse {
    #[serde(default)]
    status: i32,
    #[serde(default)]
    product: Option<OffProduct>,
}

/// The handful of OFF product fields this tool cares about. Everything is
/// optional because the database is crowd-sourced and sparse.
#[derive(Debug, Clone, Deserialize)]
pub struct OffProduct {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default)]
    pub nutriments: Option<OffNutriments>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OffNutriments {
    /// Grams of protein per declared serving, when the entry has one.
    #[serde(default)]
    pub proteins_serving: Option<f64>,
    /// Grams of protein per 100 g, the field OFF fills most reliably.
    #[serde(default, rename = "proteins_100g")]
    pub proteins_per_100g: Option<f64>,
}

impl OffProduct {
    /// Best available per-serving protein figure: the declared per-serving
    /// value when present, nothing otherwise. We deliberately do not guess
    /// from per-100g data - a wrong prefill is worse than an empty field.
    pub fn protein_per_serving(&self) -> Option<f64> {
        self.nutriments.as_ref()?.proteins_serving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_uses_public_api_by_default() {
        let client = BarcodeClient::new();
        assert_eq!(client.base_url, OFF_API_BASE);
    }

    #[test]
    fn response_parses_sparse_product() {
        let raw = r#"{
            "status": 1,
            "product": {
                "code": "0123456789012",
                "product_name": "Whey X",
                "brands": "Acme",
                "nutriments": { "proteins_serving": 24, "proteins_100g": 75 }
            }
        }"#;
        let body: OffResponse = serde_json::from_str(raw).unwrap();
        let product = body.product.unwrap();
        assert_eq!(product.product_name.as_deref(), Some("Whey X"));
        assert_eq!(product.protein_per_serving(), Some(24.0));
        assert_eq!(product.serving_size, None);
    }

    #[test]
    fn response_parses_miss() {
        let raw = r#"{ "status": 0, "status_verbose": "product not found" }"#;
        let body: OffResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.status, 0);
        assert!(body.product.is_none());
    }

    #[test]
    fn nutriments_without_serving_data_yield_none() {
        let raw = r#"{
            "status": 1,
            "product": {
                "code": "1",
                "product_name": "Mystery Bar",
                "nutriments": { "proteins_100g": 30 }
            }
        }"#;
        let body: OffResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.product.unwrap().protein_per_serving(), None);
    }
}
