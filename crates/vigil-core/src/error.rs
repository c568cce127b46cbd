/// Errors that can occur across the Vigil pipeline.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; it derives `miette::Diagnostic` so the binary can propagate it
/// with `?` inside `miette::Result`.
///
/// # Examples
///
/// ```
/// use vigil_core::VigilError;
///
/// let err = VigilError::Config("GITHUB_TOKEN not set".into());
/// assert!(err.to_string().contains("GITHUB_TOKEN"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum VigilError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// GitHub API or network failure.
    #[error("GitHub error: {0}")]
    Github(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Event payload or diff parsing failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: VigilError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = VigilError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn github_error_displays_message() {
        let err = VigilError::Github("404 Not Found".into());
        assert_eq!(err.to_string(), "GitHub error: 404 Not Found");
    }

    #[test]
    fn propagates_into_miette_reports() {
        // The binary relies on plain `?` inside miette::Result.
        fn fails() -> miette::Result<()> {
            Err(VigilError::Config("missing token".into()))?
        }
        let report = fails().unwrap_err();
        assert!(report.to_string().contains("missing token"));
    }
}
