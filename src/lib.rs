//! Pagegen - FAQ, product and comparison page generator
//!
//! Synthesizes categorized FAQ questions with a language model, coercing its
//! output into a strict schema and padding deterministically when it falls short.

pub mod blocks;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod llm;
pub mod normalize;
pub mod pages;
pub mod pipeline;
pub mod product;
pub mod prompt;
pub mod taxonomy;

pub use config::{Config, Provider};
pub use engine::{QuestionEngine, QuestionSettings, Synthesis};
pub use error::{PagegenError, Result};
pub use llm::{AnthropicModel, FixedResponseModel, LanguageModel, OfflineModel};
pub use normalize::QuestionCandidate;
pub use pipeline::{BatchReport, PageOutputs, Pipeline};
pub use product::ProductRecord;
pub use prompt::ResponseFormat;
pub use taxonomy::Category;
