use thiserror::Error;

/// All the ways things can go wrong in the engine
///
/// Nothing here is fatal to a running session: validation and not-found
/// errors are surfaced as messages, lookup failures degrade to manual entry,
/// and corrupt persisted data resets to an empty collection at load time.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Product not found: {0}")]
    NotFound(i64),

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Admission rejection, carrying exactly the first failing field.
///
/// The check order is fixed (name, source, price, protein) and observable:
/// callers only ever see the earliest problem, never a batch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a product name")]
    Name,

    #[error("Please select a protein source")]
    Source,

    #[error("Please enter a valid price")]
    Price,

    #[error("Please enter total protein amount")]
    Protein,
}

impl ValidationError {
    /// The offending field, for programmatic handling.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Name => "name",
            ValidationError::Source => "source",
            ValidationError::Price => "price",
            ValidationError::Protein => "protein",
        }
    }
}
