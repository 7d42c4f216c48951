pub mod classifier;
pub mod gateway;
pub mod interface;

pub use classifier::{FallbackPhrase, FallbackPolicy};
pub use gateway::{normalize_code, TranslationGateway};
pub use interface::{LookupRequest, LookupResult};
