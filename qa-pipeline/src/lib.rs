//! Retrieval-augmented question answering over a Qdrant collection.
//!
//! The flow for one question: cache lookup, embedding + vector search,
//! threshold filtering and ranking, grounded prompt construction, one
//! non-streaming LLM completion, then at most one cache write. A batch
//! variant answers many questions with bounded concurrency and
//! order-preserving output.
//!
//! [`QaEngine`] is the assembled stack; [`QueryPipeline`] is the same
//! orchestration with injectable backends for embedding, search,
//! generation and caching.

pub mod cache;
pub mod cfg;
pub mod engine;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod stage;
pub mod types;

pub use cache::{CacheError, MemoryCache, ResultCache, result_key};
pub use cfg::{QaConfig, QaConfigError};
pub use engine::{EngineError, HealthReport, IndexHealth, QaEngine, SystemStats};
pub use error::{ErrorKind, PipelineError};
pub use generator::{AnswerGenerator, Generator, OllamaGenerator};
pub use pipeline::{
    INVALID_INPUT_ANSWER, MAX_QUESTION_CHARS, MAX_TOP_K, NO_CONTEXT_ANSWER, PipelineConfig,
    QueryPipeline, TIMEOUT_ANSWER, UNAVAILABLE_ANSWER,
};
pub use types::{AnswerResult, RetrievalOptions, RetrievalStats, TokenUsage};

pub use vector_store::{ContextDocument, Retriever};
