// External collaborator clients: barcode database lookup and nutrition-label
// text heuristics. Nothing in here is load-bearing for the engine - every
// failure path degrades to "enter it manually".
pub mod barcode;
pub mod label;
pub mod retry;

pub use barcode::{BarcodeClient, OffProduct};
pub use label::{parse_label_text, LabelReading};
pub use retry::RetryConfig;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup request failed with status {0}")]
    RequestFailed(u16),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl LookupError {
    /// Whether retrying could plausibly help. Client errors and malformed
    /// payloads won't get better on a second attempt; flaky networks and
    /// overloaded servers might.
    pub fn is_transient(&self) -> bool {
        match self {
            LookupError::RequestFailed(status) => {
                *status >= 500 || *status == 429 || *status == 408
            }
            LookupError::NetworkError(_) => true,
            LookupError::ParseError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
