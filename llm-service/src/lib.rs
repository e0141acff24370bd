//! Thin async client for a local Ollama server.
//!
//! Two endpoints are wrapped:
//! - `POST {endpoint}/api/generate`: non-streaming text generation
//!   (`stream=false`) with token-usage counters from the response.
//! - `POST {endpoint}/api/embed`: embedding vectors for a single input.
//!
//! A best-effort health probe (`GET {endpoint}/api/tags`) is exposed for
//! `/health`-style reporting; it never panics and maps every failure to
//! an `ok=false` snapshot.

pub mod config;
pub mod error;
pub mod ollama;

pub use config::LlmModelConfig;
pub use error::{ConfigError, LlmError, Result};
pub use ollama::{Completion, HealthSnapshot, OllamaClient};
