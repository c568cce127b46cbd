use std::path::Path;

use crate::error::VigilError;

/// Identifiers and credentials resolved from the CI environment.
///
/// All three fields are required before any network call is made; a missing
/// piece is a configuration error, not a runtime one.
///
/// # Examples
///
/// ```
/// use vigil_core::CiContext;
///
/// let ctx = CiContext {
///     repo: "octocat/hello-world".into(),
///     pr_number: 42,
///     github_token: "ghp_xxxx".into(),
/// };
/// assert_eq!(ctx.pr_number, 42);
/// ```
#[derive(Debug, Clone)]
pub struct CiContext {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Pull request number.
    pub pr_number: u64,
    /// GitHub access token.
    pub github_token: String,
}

impl CiContext {
    /// Resolve the CI context from explicit overrides and the environment.
    ///
    /// Resolution order for each field: CLI override, then environment.
    /// The PR number additionally falls back to the GitHub Actions event
    /// payload at `GITHUB_EVENT_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] when the repository, token, or PR
    /// number cannot be determined.
    pub fn resolve(repo: Option<String>, pr_number: Option<u64>) -> Result<Self, VigilError> {
        let repo = match repo {
            Some(r) => r,
            None => std::env::var("GITHUB_REPOSITORY").map_err(|_| {
                VigilError::Config(
                    "repository not set. Pass --repo or set GITHUB_REPOSITORY".into(),
                )
            })?,
        };

        let github_token = std::env::var("GITHUB_TOKEN").map_err(|_| {
            VigilError::Config("GITHUB_TOKEN not set. Export it in the workflow".into())
        })?;

        let pr_number = match pr_number {
            Some(n) => n,
            None => resolve_pr_number()?,
        };

        Ok(Self {
            repo,
            pr_number,
            github_token,
        })
    }
}

fn resolve_pr_number() -> Result<u64, VigilError> {
    if let Ok(raw) = std::env::var("VIGIL_PR_NUMBER") {
        return raw
            .parse()
            .map_err(|_| VigilError::Config(format!("invalid VIGIL_PR_NUMBER: {raw}")));
    }

    if let Ok(event_path) = std::env::var("GITHUB_EVENT_PATH") {
        return pr_number_from_event(Path::new(&event_path));
    }

    Err(VigilError::Config(
        "PR number not set. Pass --pr, set VIGIL_PR_NUMBER, or run on a pull_request event"
            .into(),
    ))
}

/// Extract the pull request number from a GitHub Actions event payload file.
///
/// Handles `pull_request` events (`pull_request.number`) and issue-style
/// events where the number is at the top level (`number`).
///
/// # Errors
///
/// Returns [`VigilError::Io`] if the file cannot be read,
/// [`VigilError::Serialization`] if it is not valid JSON, or
/// [`VigilError::Parse`] if no PR number is present.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use vigil_core::pr_number_from_event;
///
/// let number = pr_number_from_event(Path::new("/tmp/event.json")).unwrap();
/// assert!(number > 0);
/// ```
pub fn pr_number_from_event(path: &Path) -> Result<u64, VigilError> {
    let content = std::fs::read_to_string(path)?;
    let payload: serde_json::Value = serde_json::from_str(&content)?;

    payload
        .get("pull_request")
        .and_then(|pr| pr.get("number"))
        .or_else(|| payload.get("number"))
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| {
            VigilError::Parse(format!(
                "no pull request number in event payload {}",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_payload(json: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn pull_request_event_payload() {
        let (_dir, path) = write_payload(r#"{"action":"opened","pull_request":{"number":17}}"#);
        assert_eq!(pr_number_from_event(&path).unwrap(), 17);
    }

    #[test]
    fn top_level_number_payload() {
        let (_dir, path) = write_payload(r#"{"number":5,"action":"synchronize"}"#);
        assert_eq!(pr_number_from_event(&path).unwrap(), 5);
    }

    #[test]
    fn nested_number_wins_over_top_level() {
        let (_dir, path) = write_payload(r#"{"number":1,"pull_request":{"number":2}}"#);
        assert_eq!(pr_number_from_event(&path).unwrap(), 2);
    }

    #[test]
    fn payload_without_number_is_parse_error() {
        let (_dir, path) = write_payload(r#"{"action":"push"}"#);
        assert!(matches!(
            pr_number_from_event(&path),
            Err(VigilError::Parse(_))
        ));
    }

    #[test]
    fn invalid_json_is_serialization_error() {
        let (_dir, path) = write_payload("not json");
        assert!(matches!(
            pr_number_from_event(&path),
            Err(VigilError::Serialization(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = pr_number_from_event(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(VigilError::Io(_))));
    }
}
