// Core engine - everything with actual logic lives here.
// The CLI (and any future front end) is just plumbing around these modules.
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod favorites;
pub mod lookup;
pub mod models;
pub mod persist;
pub mod providers;
pub mod ranking;
pub mod store;
pub mod valuation;

pub use config::Config;
pub use error::{Error, ValidationError};
pub use export::{ExportFormat, Exporter};
pub use favorites::FavoriteSet;
pub use lookup::{BarcodeHit, BarcodeProvider, LabelReader, LookupService, ScanGate, ScanTicket};
pub use models::{Product, ProductDraft, ProteinAmount};
pub use ranking::SortKey;
pub use store::ProductStore;
pub use valuation::Valuation;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
