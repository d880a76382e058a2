//! Question synthesis engine.
//!
//! One invocation: build the prompt, call the model once, extract candidates,
//! normalize them, and pad with deterministic fallback questions until exactly
//! the requested number of unique, taxonomy-valid questions is available.
//! Model failures never reach the caller; they degrade to fallback output.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{PagegenError, Result};
use crate::extract::{extract, ExtractionStrategy};
use crate::fallback::{fallback_capacity, FallbackGenerator};
use crate::llm::LanguageModel;
use crate::normalize::{normalize_into, QuestionCandidate, QuestionSet};
use crate::product::ProductRecord;
use crate::prompt::{build_prompt, ResponseFormat};

/// Question counts and output format used by the engine
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QuestionSettings {
    /// Exact number of questions returned per product.
    pub min_questions: usize,
    /// Number of questions requested from the model; must exceed `min_questions`.
    pub target_questions: usize,
    /// Largest `minimum_count` accepted at invocation.
    pub max_questions: usize,
    pub response_format: ResponseFormat,
}

impl Default for QuestionSettings {
    fn default() -> Self {
        Self {
            min_questions: 15,
            target_questions: 20,
            max_questions: 100,
            response_format: ResponseFormat::Json,
        }
    }
}

impl QuestionSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_questions == 0 {
            return Err(config_error("min_questions must be at least 1"));
        }
        if self.target_questions <= self.min_questions {
            return Err(config_error(format!(
                "target_questions ({}) must exceed min_questions ({})",
                self.target_questions, self.min_questions
            )));
        }
        if self.min_questions > self.max_questions {
            return Err(config_error(format!(
                "min_questions ({}) exceeds max_questions ({})",
                self.min_questions, self.max_questions
            )));
        }
        if self.max_questions > fallback_capacity() {
            return Err(config_error(format!(
                "max_questions ({}) exceeds fallback capacity ({})",
                self.max_questions,
                fallback_capacity()
            )));
        }
        Ok(())
    }

    /// Target count sent to the model for a given minimum.
    fn target_for(&self, minimum_count: usize) -> usize {
        let headroom = self.target_questions.saturating_sub(self.min_questions).max(1);
        self.target_questions.max(minimum_count + headroom)
    }
}

fn config_error(message: impl Into<String>) -> PagegenError {
    PagegenError::Config {
        message: message.into(),
    }
}

/// Questions plus provenance for one synthesis run
#[derive(Debug, Clone, Serialize)]
pub struct Synthesis {
    pub questions: Vec<QuestionCandidate>,
    pub model: String,
    pub from_model: usize,
    pub from_fallback: usize,
    pub strategy: ExtractionStrategy,
    pub model_error: Option<String>,
    pub prompt_sha256: String,
}

/// Produces validated FAQ questions for products using an injected model
pub struct QuestionEngine<M: LanguageModel> {
    model: M,
    settings: QuestionSettings,
}

impl<M: LanguageModel> QuestionEngine<M> {
    pub fn new(model: M, settings: QuestionSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { model, settings })
    }

    pub fn settings(&self) -> &QuestionSettings {
        &self.settings
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Prompt that `synthesize` would send for this product and count.
    pub fn prompt_for(&self, product: &ProductRecord, minimum_count: usize) -> String {
        build_prompt(
            product,
            self.settings.target_for(minimum_count),
            self.settings.response_format,
        )
    }

    /// Exactly `minimum_count` unique, taxonomy-valid questions for `product`.
    pub fn synthesize(
        &self,
        product: &ProductRecord,
        minimum_count: usize,
    ) -> Result<Vec<QuestionCandidate>> {
        Ok(self.synthesize_detailed(product, minimum_count)?.questions)
    }

    /// `synthesize` with the configured default count.
    pub fn generate(&self, product: &ProductRecord) -> Result<Vec<QuestionCandidate>> {
        self.synthesize(product, self.settings.min_questions)
    }

    /// Same as `synthesize`, also reporting where each question came from.
    pub fn synthesize_detailed(
        &self,
        product: &ProductRecord,
        minimum_count: usize,
    ) -> Result<Synthesis> {
        if minimum_count == 0 {
            return Err(config_error("minimum_count must be at least 1"));
        }
        if minimum_count > self.settings.max_questions {
            return Err(config_error(format!(
                "minimum_count ({}) exceeds max_questions ({})",
                minimum_count, self.settings.max_questions
            )));
        }
        product.validate()?;

        let prompt = self.prompt_for(product, minimum_count);
        let prompt_sha256 = compute_hash(&prompt);

        let (raw, model_error) = match self.model.complete(&prompt) {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!(
                    "Model '{}' failed for {}: {}; using fallback questions",
                    self.model.name(),
                    product.display_name(),
                    e
                );
                (String::new(), Some(e.to_string()))
            }
        };

        let extraction = extract(&raw, self.settings.response_format);
        tracing::debug!(
            "Extracted {} raw candidates via {:?}",
            extraction.candidates.len(),
            extraction.strategy
        );

        let mut set = QuestionSet::new(minimum_count);
        let from_model = normalize_into(&mut set, &extraction.candidates);

        let from_fallback = if set.is_full() {
            0
        } else {
            tracing::info!(
                "{} usable model questions for {}, padding {} from fallback",
                from_model,
                product.display_name(),
                set.remaining()
            );
            FallbackGenerator::new(product).fill(&mut set)?
        };

        Ok(Synthesis {
            questions: set.into_vec(),
            model: self.model.name().to_string(),
            from_model,
            from_fallback,
            strategy: extraction.strategy,
            model_error,
            prompt_sha256,
        })
    }
}

fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
