//! Layered configuration.
//!
//! Defaults are overridden by `pagegen.toml` (or the file named by
//! `PAGEGEN_CONFIG`), which is in turn overridden by `PAGEGEN_*` environment
//! variables. A `.env` file is loaded first when present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::QuestionSettings;
use crate::error::{PagegenError, Result};
use crate::llm::{AnthropicModel, AnthropicSettings, LanguageModel, OfflineModel, DEFAULT_MODEL};

const DEFAULT_CONFIG_FILE: &str = "pagegen.toml";

/// Configuration loaded from pagegen.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub questions: QuestionSettings,
    pub paths: PathsConfig,
}

/// Which model collaborator to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    Offline,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Read from ANTHROPIC_API_KEY only; never written back out
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Anthropic,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            timeout_secs: 60,
            max_retries: 3,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input/product_data.json"),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

impl Config {
    /// Load configuration: environment (plus `.env`) over TOML over defaults.
    ///
    /// `path` wins over `PAGEGEN_CONFIG`; without either, `pagegen.toml` is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_path) = std::env::var("PAGEGEN_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("PAGEGEN_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(p) => Self::from_file(&p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PagegenError::Config {
            message: format!("failed to read config {:?}: {}", path, e),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PAGEGEN_*` and `ANTHROPIC_API_KEY` overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("PAGEGEN_PROVIDER") {
            self.llm.provider = match provider.trim().to_lowercase().as_str() {
                "anthropic" => Provider::Anthropic,
                "offline" => Provider::Offline,
                other => {
                    return Err(PagegenError::Config {
                        message: format!("unknown provider '{}'", other),
                    })
                }
            };
        }
        if let Some(model) = lookup("PAGEGEN_MODEL") {
            self.llm.model = model;
        }
        if let Some(v) = parse_var(&lookup, "PAGEGEN_MAX_TOKENS")? {
            self.llm.max_tokens = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGEGEN_TEMPERATURE")? {
            self.llm.temperature = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGEGEN_TIMEOUT_SECS")? {
            self.llm.timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGEGEN_MAX_RETRIES")? {
            self.llm.max_retries = v;
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.llm.api_key = Some(key);
        }

        if let Some(v) = parse_var(&lookup, "PAGEGEN_MIN_QUESTIONS")? {
            self.questions.min_questions = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGEGEN_TARGET_QUESTIONS")? {
            self.questions.target_questions = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGEGEN_MAX_QUESTIONS")? {
            self.questions.max_questions = v;
        }
        if let Some(format) = lookup("PAGEGEN_RESPONSE_FORMAT") {
            self.questions.response_format = format
                .parse()
                .map_err(|message| PagegenError::Config { message })?;
        }

        if let Some(input) = lookup("PAGEGEN_INPUT") {
            self.paths.input = PathBuf::from(input);
        }
        if let Some(dir) = lookup("PAGEGEN_OUTPUT_DIR") {
            self.paths.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.questions.validate()?;
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(PagegenError::Config {
                message: format!("temperature {} outside 0.0..=1.0", self.llm.temperature),
            });
        }
        if self.llm.max_tokens == 0 {
            return Err(PagegenError::Config {
                message: "max_tokens must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Construct the configured model collaborator once for the whole run.
    pub fn build_model(&self) -> Result<Box<dyn LanguageModel>> {
        match self.llm.provider {
            Provider::Offline => Ok(Box::new(OfflineModel)),
            Provider::Anthropic => {
                let model = AnthropicModel::new(AnthropicSettings {
                    api_key: self.llm.api_key.clone().unwrap_or_default(),
                    model: self.llm.model.clone(),
                    max_tokens: self.llm.max_tokens,
                    temperature: self.llm.temperature,
                    timeout: Duration::from_secs(self.llm.timeout_secs),
                    max_retries: self.llm.max_retries,
                })?;
                Ok(Box::new(model))
            }
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PagegenError::Config {
                message: format!("{}={:?}: {}", key, raw, e),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ResponseFormat;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.questions.min_questions, 15);
        assert_eq!(config.questions.target_questions, 20);
        assert_eq!(config.llm.provider, Provider::Anthropic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_override() {
        let config = Config::from_toml(
            r#"
            [llm]
            provider = "offline"

            [questions]
            min_questions = 12
            response_format = "lines"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.provider, Provider::Offline);
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.questions.min_questions, 12);
        assert_eq!(config.questions.target_questions, 20);
        assert_eq!(config.questions.response_format, ResponseFormat::Lines);
        assert_eq!(config.paths.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_env_overrides_toml() {
        let mut config = Config::from_toml("[questions]\nmin_questions = 12\n").unwrap();
        config
            .apply_env(env(&[
                ("PAGEGEN_MIN_QUESTIONS", "16"),
                ("PAGEGEN_TARGET_QUESTIONS", "24"),
                ("PAGEGEN_PROVIDER", "Offline"),
                ("PAGEGEN_OUTPUT_DIR", "/tmp/out"),
                ("ANTHROPIC_API_KEY", "sk-test"),
            ]))
            .unwrap();
        assert_eq!(config.questions.min_questions, 16);
        assert_eq!(config.questions.target_questions, 24);
        assert_eq!(config.llm.provider, Provider::Offline);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.paths.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_env_parse_errors() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("PAGEGEN_MIN_QUESTIONS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("PAGEGEN_MIN_QUESTIONS"));

        let err = config.apply_env(env(&[("PAGEGEN_PROVIDER", "flan")])).unwrap_err();
        assert!(matches!(err, PagegenError::Config { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_counts() {
        let config = Config::from_toml("[questions]\nmin_questions = 20\ntarget_questions = 20\n").unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_toml("[questions]\nmin_questions = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_toml("[llm]\ntemperature = 1.5\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[questions\nmin_questions = ").unwrap_err();
        assert!(matches!(err, PagegenError::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pagegen.toml");
        std::fs::write(&path, "[paths]\ninput = \"data/serum.json\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.paths.input, PathBuf::from("data/serum.json"));
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_build_model() {
        let mut config = Config::default();
        config.llm.provider = Provider::Offline;
        assert_eq!(config.build_model().unwrap().name(), "offline");

        config.llm.provider = Provider::Anthropic;
        config.llm.api_key = None;
        assert!(config.build_model().is_err());
    }
}
