use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VigilError;

/// Top-level configuration loaded from `.vigil.toml`.
///
/// Tunables live in the config file; identifiers and secrets come from the
/// CI environment (see [`crate::CiContext`]). CLI flags override both.
///
/// # Examples
///
/// ```
/// use vigil_core::VigilConfig;
///
/// let config = VigilConfig::default();
/// assert_eq!(config.review.max_comments_per_file, 10);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review behavior settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl VigilConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Io`] if the file cannot be read, or
    /// [`VigilError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vigil_core::VigilConfig;
    /// use std::path::Path;
    ///
    /// let config = VigilConfig::from_file(Path::new(".vigil.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, VigilError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_core::VigilConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// max_comments_per_file = 3
    /// "#;
    /// let config = VigilConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.max_comments_per_file, 3);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, VigilError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// LLM provider configuration.
///
/// Works with any endpoint that speaks the OpenAI chat-completions protocol.
///
/// # Examples
///
/// ```
/// use vigil_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o-mini");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider. Falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Sampling temperature (default: 0.2).
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
        }
    }
}

/// Review behavior configuration.
///
/// # Examples
///
/// ```
/// use vigil_core::ReviewConfig;
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.summary_delimiter, "---SUMMARY---");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Token that separates inline comments from the summary in LLM output.
    #[serde(default = "default_summary_delimiter")]
    pub summary_delimiter: String,
    /// Summary used when the LLM response lacks the delimiter.
    /// `{filename}` is replaced with the file path.
    #[serde(default = "default_fallback_summary")]
    pub fallback_summary: String,
    /// Maximum inline comments to keep per file (default: 10).
    #[serde(default = "default_max_comments_per_file")]
    pub max_comments_per_file: usize,
    /// Heading for the aggregated summary comment.
    #[serde(default = "default_summary_heading")]
    pub summary_heading: String,
}

fn default_summary_delimiter() -> String {
    "---SUMMARY---".into()
}

fn default_fallback_summary() -> String {
    "Reviewed `{filename}`; no structured summary was returned.".into()
}

fn default_max_comments_per_file() -> usize {
    10
}

fn default_summary_heading() -> String {
    "## Vigil review summary".into()
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            summary_delimiter: default_summary_delimiter(),
            fallback_summary: default_fallback_summary(),
            max_comments_per_file: default_max_comments_per_file(),
            summary_heading: default_summary_heading(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = VigilConfig::default();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.2);
        assert!(config.llm.api_key.is_none());
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.review.summary_delimiter, "---SUMMARY---");
        assert_eq!(config.review.max_comments_per_file, 10);
        assert!(config.review.fallback_summary.contains("{filename}"));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[llm]
model = "gpt-4o"
"#;
        let config = VigilConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.review.max_comments_per_file, 10);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r###"
[llm]
model = "llama3"
base_url = "http://localhost:11434"
temperature = 0.0

[review]
summary_delimiter = "===SUMMARY==="
fallback_summary = "no summary for {filename}"
max_comments_per_file = 3
summary_heading = "## Bot review"
"###;
        let config = VigilConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.review.summary_delimiter, "===SUMMARY===");
        assert_eq!(config.review.max_comments_per_file, 3);
        assert_eq!(config.review.summary_heading, "## Bot review");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = VigilConfig::from_toml("").unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.review.summary_delimiter, "---SUMMARY---");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = VigilConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_returns_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = VigilConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(VigilError::Io(_))));
    }
}
