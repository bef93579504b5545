//! In-memory store for the Bitext customer support dataset
//!
//! The dataset is a flat JSON array of support exchanges. Records are loaded
//! once at startup and shared read-only across tools; per-record embeddings
//! are computed lazily on the first semantic query and memoized.

mod store;
mod types;

pub use store::DatasetStore;
pub use types::{Column, DatasetError, SupportRecord, UnknownColumn};
