//! Vector retrieval over Qdrant.
//!
//! The crate splits responsibilities into focused modules:
//! - [`index`]: `VectorIndex` trait plus the Qdrant-backed implementation
//! - [`embed`]: `Embedder` trait plus the Ollama-backed implementation
//! - [`retrieve`]: the `Retriever`: embed a question, query the index,
//!   filter by similarity threshold, and rank the survivors
//! - [`record`]: shared record types ([`ContextDocument`], [`IndexMatch`])
//!
//! Retrieval is read-only; ingestion is a separate concern handled by the
//! document pipeline that populates the collection.

mod config;
mod embed;
mod error;
mod index;
mod record;
mod retrieve;

pub use config::VectorStoreConfig;
pub use embed::{Embedder, OllamaEmbedder};
pub use error::VectorStoreError;
pub use index::{QdrantIndex, VectorIndex};
pub use record::{ContextDocument, IndexMatch};
pub use retrieve::Retriever;
