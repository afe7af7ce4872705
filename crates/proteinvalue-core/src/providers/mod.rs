// Provider implementations bridging external lookup clients to the engine
pub mod openfoodfacts;

pub use openfoodfacts::OpenFoodFactsProvider;
