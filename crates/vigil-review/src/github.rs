use serde::Deserialize;
use vigil_core::{AnchoredComment, ChangedFile, VigilError};

/// GitHub pull request client for fetching changed files and posting comments.
///
/// Holds an explicit `octocrab` instance and a raw `reqwest` client; nothing
/// is kept in process-wide state, so test doubles can be swapped in at the
/// construction site.
///
/// # Examples
///
/// ```
/// use vigil_review::github::parse_repo_reference;
///
/// let (owner, name) = parse_repo_reference("rust-lang/rust").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(name, "rust");
/// ```
pub struct GithubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
}

#[derive(Deserialize)]
struct RawChangedFile {
    filename: String,
    // Absent for binary files and pure renames.
    patch: Option<String>,
}

const PER_PAGE: usize = 100;

impl GithubClient {
    /// Create a client from an access token.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Github`] if the client cannot be built.
    pub fn new(token: &str) -> Result<Self, VigilError> {
        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| VigilError::Github(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::new();

        Ok(Self {
            octocrab,
            http,
            token: token.to_string(),
        })
    }

    /// Fetch the changed files of a pull request with their patches.
    ///
    /// Follows pagination until a short page. A missing `patch` field (binary
    /// files, pure renames) becomes an empty string; truncated patches are
    /// passed through as-is.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Github`] on network errors or non-success
    /// statuses; in that case the run posts nothing.
    pub async fn list_pr_files(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, VigilError> {
        let mut files = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "https://api.github.com/repos/{repo}/pulls/{pr_number}/files?per_page={PER_PAGE}&page={page}"
            );
            let response = self
                .http
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .header("Authorization", format!("Bearer {}", self.token))
                .header("User-Agent", "vigil")
                .send()
                .await
                .map_err(|e| VigilError::Github(format!("failed to fetch PR files: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(VigilError::Github(format!(
                    "GitHub API error {status}: {body}"
                )));
            }

            let batch: Vec<RawChangedFile> = response
                .json()
                .await
                .map_err(|e| VigilError::Github(format!("failed to read files response: {e}")))?;

            let batch_len = batch.len();
            files.extend(batch.into_iter().map(|f| ChangedFile {
                filename: f.filename,
                patch: f.patch.unwrap_or_default(),
            }));

            if batch_len < PER_PAGE {
                return Ok(files);
            }
            page += 1;
        }
    }

    /// Fetch the SHA of the pull request's current head commit.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Github`] on API errors or when the response
    /// carries no `head.sha`. The caller skips inline posting in that case;
    /// summary posting may still proceed.
    pub async fn pr_head_sha(&self, repo: &str, pr_number: u64) -> Result<String, VigilError> {
        let url = format!("https://api.github.com/repos/{repo}/pulls/{pr_number}");
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "vigil")
            .send()
            .await
            .map_err(|e| VigilError::Github(format!("failed to fetch PR: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VigilError::Github(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VigilError::Github(format!("failed to read PR response: {e}")))?;

        payload
            .get("head")
            .and_then(|h| h.get("sha"))
            .and_then(|s| s.as_str())
            .map(String::from)
            .ok_or_else(|| VigilError::Github("PR response has no head.sha".into()))
    }

    /// Post one inline review comment anchored by diff position.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Github`] on API errors. Callers record the
    /// failure and continue with subsequent comments.
    pub async fn post_review_comment(
        &self,
        repo: &str,
        pr_number: u64,
        commit_sha: &str,
        comment: &AnchoredComment,
    ) -> Result<(), VigilError> {
        let route = format!("/repos/{repo}/pulls/{pr_number}/comments");
        let body = serde_json::json!({
            "body": comment.body,
            "commit_id": commit_sha,
            "path": comment.filename,
            "position": comment.position,
        });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&body))
            .await
            .map_err(|e| VigilError::Github(format!("failed to post review comment: {e}")))?;

        Ok(())
    }

    /// Post the aggregated summary as an issue comment on the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Github`] on API errors.
    pub async fn post_issue_comment(
        &self,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), VigilError> {
        let route = format!("/repos/{repo}/issues/{pr_number}/comments");
        let payload = serde_json::json!({ "body": body });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| VigilError::Github(format!("failed to post summary comment: {e}")))?;

        Ok(())
    }
}

/// Parse a repository reference (`owner/name`) into its components.
///
/// # Errors
///
/// Returns [`VigilError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use vigil_review::github::parse_repo_reference;
///
/// let (owner, name) = parse_repo_reference("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(name, "hello-world");
/// ```
pub fn parse_repo_reference(repo: &str) -> Result<(String, String), VigilError> {
    let Some((owner, name)) = repo.split_once('/') else {
        return Err(VigilError::Config(format!(
            "invalid repository '{repo}', expected owner/name"
        )));
    };
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(VigilError::Config(format!(
            "invalid repository '{repo}', expected owner/name"
        )));
    }
    Ok((owner.to_string(), name.to_string()))
}
