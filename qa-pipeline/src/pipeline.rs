//! The question-answering pipeline.
//!
//! One `answer` call runs cache lookup, retrieval, generation and at
//! most one cache write, in that order. The only error that escapes is
//! invalid input; every backend failure degrades into a `success=false`
//! result carrying a fixed user-facing message.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::StreamExt;
use tracing::{info, warn};
use vector_store::{Retriever, VectorStoreError};

use crate::cache::{ResultCache, result_key};
use crate::error::PipelineError;
use crate::generator::AnswerGenerator;
use crate::stage::{Stage, observe};
use crate::types::{AnswerResult, RetrievalOptions, RetrievalStats};

/// Hard upper bound on the per-call `k`.
pub const MAX_TOP_K: usize = 20;
/// Hard upper bound on question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Answer used when no document survives the similarity threshold.
pub const NO_CONTEXT_ANSWER: &str = "I could not find relevant information in the \
knowledge base to answer this question. Try rephrasing it or asking about a \
different topic.";

/// Answer used when a backend is unavailable.
pub const UNAVAILABLE_ANSWER: &str =
    "Sorry, the answer service is temporarily unavailable. Please try again later.";

/// Answer used when generation exceeds its time budget.
pub const TIMEOUT_ANSWER: &str =
    "Sorry, generating the answer took too long. Please try again later.";

/// Answer used for a batch slot whose input was rejected.
pub const INVALID_INPUT_ANSWER: &str = "This question could not be processed: \
the request was invalid. Check the question text and retrieval settings.";

/// Static pipeline settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// `k` used when the caller passes none.
    pub default_k: usize,
    /// Similarity threshold used when the caller passes none.
    pub default_threshold: f32,
    /// Lifetime of cached answers.
    pub cache_ttl: Duration,
    /// Max questions answered concurrently by `answer_batch`.
    pub batch_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_k: 5,
            default_threshold: 0.7,
            cache_ttl: Duration::from_secs(3600),
            batch_concurrency: 4,
        }
    }
}

/// Retrieval-augmented answer pipeline.
pub struct QueryPipeline {
    retriever: Arc<Retriever>,
    generator: AnswerGenerator,
    cache: Option<Arc<dyn ResultCache>>,
    config: PipelineConfig,
}

/// Validated per-call parameters.
struct ResolvedQuery {
    question: String,
    k: usize,
    threshold: f32,
    use_cache: bool,
}

impl QueryPipeline {
    /// Wires the pipeline. Pass `cache: None` to disable caching entirely.
    pub fn new(
        retriever: Arc<Retriever>,
        generator: AnswerGenerator,
        cache: Option<Arc<dyn ResultCache>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            retriever,
            generator,
            cache,
            config,
        }
    }

    /// Whether a cache backend is wired in.
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generation model identifier.
    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Embedding model identifier.
    pub fn embedding_model(&self) -> &str {
        self.retriever.embedding_model()
    }

    /// Answers one question.
    ///
    /// Returns `Err` only for invalid input. Backend failures produce an
    /// `Ok` result with `success=false`, a fixed message and the error
    /// detail in `error_message`. Such degraded results are never cached,
    /// and neither is the zero-document outcome.
    pub async fn answer(
        &self,
        question: &str,
        options: &RetrievalOptions,
    ) -> Result<AnswerResult, PipelineError> {
        let started = Instant::now();
        let query = self.resolve(question, options)?;
        let cache_key = result_key(&query.question, query.k, query.threshold);

        if query.use_cache {
            if let Some(hit) = self.cache_lookup(&cache_key).await {
                let mut result = hit;
                result.from_cache = true;
                result.total_time_seconds = started.elapsed().as_secs_f64();
                info!(question_chars = query.question.chars().count(), "cache hit");
                return Ok(result);
            }
        }

        let retrieve_started = Instant::now();
        let documents = match self
            .retriever
            .retrieve(&query.question, query.k, query.threshold)
            .await
        {
            Ok(docs) => {
                observe(Stage::Retrieve, "ok", retrieve_started.elapsed());
                docs
            }
            Err(VectorStoreError::InvalidQuery(msg)) => {
                return Err(PipelineError::InvalidInput(msg));
            }
            Err(e) => {
                observe(Stage::Retrieve, "error", retrieve_started.elapsed());
                warn!(error = %e, "retrieval failed, returning degraded result");
                return Ok(self.degraded(&query, started, e.into(), vec![], None));
            }
        };

        let stats = RetrievalStats::for_documents(&documents, query.threshold);

        if documents.is_empty() {
            info!("no context above threshold, answering without generation");
            return Ok(AnswerResult {
                success: false,
                question: query.question,
                answer: NO_CONTEXT_ANSWER.to_string(),
                context_documents: vec![],
                generation_time_seconds: None,
                total_time_seconds: started.elapsed().as_secs_f64(),
                model_name: self.generator.model_name().to_string(),
                from_cache: false,
                answered_at: Utc::now(),
                token_usage: None,
                retrieval_stats: Some(stats),
                error_message: None,
            });
        }

        let generate_started = Instant::now();
        let output = match self.generator.generate(&query.question, &documents).await {
            Ok(out) => {
                observe(Stage::Generate, "ok", generate_started.elapsed());
                out
            }
            Err(e) => {
                observe(Stage::Generate, "error", generate_started.elapsed());
                warn!(error = %e, "generation failed, returning degraded result");
                return Ok(self.degraded(&query, started, e, documents, Some(stats)));
            }
        };

        let result = AnswerResult {
            success: true,
            question: query.question,
            answer: output.answer,
            context_documents: documents,
            generation_time_seconds: Some(output.generation_time_seconds),
            total_time_seconds: started.elapsed().as_secs_f64(),
            model_name: output.model_name,
            from_cache: false,
            answered_at: Utc::now(),
            token_usage: Some(output.token_usage),
            retrieval_stats: Some(stats),
            error_message: None,
        };

        if query.use_cache {
            self.cache_store(&cache_key, &result).await;
        }

        Ok(result)
    }

    /// Answers a batch of questions with bounded concurrency.
    ///
    /// Output order matches input order and the call never fails: a
    /// question that would return `Err` from [`QueryPipeline::answer`]
    /// yields a degraded entry in its slot instead.
    pub async fn answer_batch(
        &self,
        questions: &[String],
        options: &RetrievalOptions,
    ) -> Vec<AnswerResult> {
        let concurrency = self.config.batch_concurrency.max(1);

        futures::stream::iter(questions.iter().map(|question| async move {
            let started = Instant::now();
            match self.answer(question, options).await {
                Ok(result) => result,
                Err(e) => self.rejected(question, started, e),
            }
        }))
        .buffered(concurrency)
        .collect()
        .await
    }

    fn resolve(
        &self,
        question: &str,
        options: &RetrievalOptions,
    ) -> Result<ResolvedQuery, PipelineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }
        let chars = question.chars().count();
        if chars > MAX_QUESTION_CHARS {
            return Err(PipelineError::InvalidInput(format!(
                "question too long: {chars} chars (max {MAX_QUESTION_CHARS})"
            )));
        }

        let k = options.k.unwrap_or(self.config.default_k);
        if !(1..=MAX_TOP_K).contains(&k) {
            return Err(PipelineError::InvalidInput(format!(
                "k must be in 1..={MAX_TOP_K}, got {k}"
            )));
        }

        let threshold = options
            .similarity_threshold
            .unwrap_or(self.config.default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::InvalidInput(format!(
                "similarity threshold must be in [0, 1], got {threshold}"
            )));
        }

        Ok(ResolvedQuery {
            question: question.to_string(),
            k,
            threshold,
            use_cache: options.use_cache && self.cache.is_some(),
        })
    }

    /// Cache read, folded to a miss on failure.
    async fn cache_lookup(&self, key: &str) -> Option<AnswerResult> {
        let cache = self.cache.as_ref()?;
        let started = Instant::now();
        match cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<AnswerResult>(&raw) {
                Ok(result) => {
                    observe(Stage::CacheLookup, "hit", started.elapsed());
                    Some(result)
                }
                Err(e) => {
                    observe(Stage::CacheLookup, "decode_error", started.elapsed());
                    warn!(error = %e, "cached entry is not decodable, treating as miss");
                    None
                }
            },
            Ok(None) => {
                observe(Stage::CacheLookup, "miss", started.elapsed());
                None
            }
            Err(e) => {
                observe(Stage::CacheLookup, "error", started.elapsed());
                warn!(error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Cache write, never fatal.
    async fn cache_store(&self, key: &str, result: &AnswerResult) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let started = Instant::now();
        let raw = match serde_json::to_string(result) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "result not serializable, skipping cache write");
                return;
            }
        };
        match cache.set(key, raw, self.config.cache_ttl).await {
            Ok(()) => observe(Stage::CacheStore, "ok", started.elapsed()),
            Err(e) => {
                observe(Stage::CacheStore, "error", started.elapsed());
                warn!(error = %e, "cache write failed, answer still returned");
            }
        }
    }

    fn degraded(
        &self,
        query: &ResolvedQuery,
        started: Instant,
        error: PipelineError,
        documents: Vec<vector_store::ContextDocument>,
        stats: Option<RetrievalStats>,
    ) -> AnswerResult {
        let answer = match &error {
            PipelineError::GenerationTimeout(_) => TIMEOUT_ANSWER,
            _ => UNAVAILABLE_ANSWER,
        };
        AnswerResult {
            success: false,
            question: query.question.clone(),
            answer: answer.to_string(),
            context_documents: documents,
            generation_time_seconds: None,
            total_time_seconds: started.elapsed().as_secs_f64(),
            model_name: self.generator.model_name().to_string(),
            from_cache: false,
            answered_at: Utc::now(),
            token_usage: None,
            retrieval_stats: stats,
            error_message: Some(error.to_string()),
        }
    }

    /// Degraded entry for a batch slot whose input was rejected.
    fn rejected(&self, question: &str, started: Instant, error: PipelineError) -> AnswerResult {
        AnswerResult {
            success: false,
            question: question.trim().to_string(),
            answer: INVALID_INPUT_ANSWER.to_string(),
            context_documents: vec![],
            generation_time_seconds: None,
            total_time_seconds: started.elapsed().as_secs_f64(),
            model_name: self.generator.model_name().to_string(),
            from_cache: false,
            answered_at: Utc::now(),
            token_usage: None,
            retrieval_stats: None,
            error_message: Some(error.to_string()),
        }
    }
}
