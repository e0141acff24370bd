//! Answer generation over retrieved context.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use llm_service::{Completion, OllamaClient};
use tracing::debug;
use vector_store::ContextDocument;

use crate::error::PipelineError;
use crate::prompt::build_prompt;
use crate::types::TokenUsage;

/// Completion backend seam.
///
/// The pipeline only needs one non-streaming completion per answer;
/// implement this to swap the LLM provider.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Runs one completion for a fully rendered prompt.
    async fn complete(&self, prompt: &str) -> Result<Completion, PipelineError>;

    /// Model identifier, reported in results.
    fn model_name(&self) -> &str;
}

/// Ollama-backed generator.
pub struct OllamaGenerator {
    client: Arc<OllamaClient>,
}

impl OllamaGenerator {
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn complete(&self, prompt: &str) -> Result<Completion, PipelineError> {
        Ok(self.client.generate(prompt).await?)
    }

    fn model_name(&self) -> &str {
        self.client.model()
    }
}

/// One generation pass: answer text plus timing and usage.
pub struct GenerationOutput {
    pub answer: String,
    pub generation_time_seconds: f64,
    pub model_name: String,
    pub token_usage: TokenUsage,
}

/// Builds the grounded prompt and runs the completion.
pub struct AnswerGenerator {
    generator: Arc<dyn Generator>,
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Generates an answer grounded in `documents`.
    ///
    /// Timing covers the completion call only, not prompt rendering.
    ///
    /// # Errors
    /// [`PipelineError::Generation`] or [`PipelineError::GenerationTimeout`]
    /// when the backend fails.
    pub async fn generate(
        &self,
        question: &str,
        documents: &[ContextDocument],
    ) -> Result<GenerationOutput, PipelineError> {
        let prompt = build_prompt(question, documents);

        let started = Instant::now();
        let completion = self.generator.complete(&prompt).await?;
        let generation_time_seconds = started.elapsed().as_secs_f64();

        debug!(
            model = self.generator.model_name(),
            elapsed_s = generation_time_seconds,
            completion_tokens = completion.completion_tokens,
            "generation completed"
        );

        Ok(GenerationOutput {
            answer: completion.text,
            generation_time_seconds,
            model_name: self.generator.model_name().to_string(),
            token_usage: TokenUsage::new(completion.prompt_tokens, completion.completion_tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn complete(&self, prompt: &str) -> Result<Completion, PipelineError> {
            Ok(Completion {
                text: format!("saw {} chars", prompt.len()),
                prompt_tokens: 10,
                completion_tokens: 5,
            })
        }

        fn model_name(&self) -> &str {
            "echo-model"
        }
    }

    #[tokio::test]
    async fn output_carries_usage_and_model() {
        let generator = AnswerGenerator::new(Arc::new(EchoGenerator));
        let docs = vec![ContextDocument {
            content: "some context".into(),
            metadata: BTreeMap::new(),
            similarity_score: 0.9,
            rank: 1,
        }];

        let out = generator.generate("why?", &docs).await.unwrap();
        assert_eq!(out.model_name, "echo-model");
        assert_eq!(out.token_usage.total_tokens, 15);
        assert!(out.answer.starts_with("saw "));
        assert!(out.generation_time_seconds >= 0.0);
    }
}
