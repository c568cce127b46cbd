use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use vigil_core::{AnchoredComment, ChangedFile, SummaryEntry, VigilConfig, VigilError};

use crate::github::GithubClient;
use crate::llm::{ChatMessage, LlmClient, Role};
use crate::position;
use crate::prompt;

/// LLM feedback for one changed file, paired with the patch it refers to.
#[derive(Debug, Clone)]
pub struct FileFeedback {
    /// Path of the reviewed file.
    pub filename: String,
    /// The file's patch text, needed by the position mapper.
    pub patch: String,
    /// Ordered, deduplicated inline comment candidates.
    pub comments: Vec<String>,
}

/// Output of the generation stage: per-file feedback plus summary fragments.
#[derive(Debug, Clone)]
pub struct GeneratedReview {
    /// Feedback for each file that had a non-empty patch, in listing order.
    pub files: Vec<FileFeedback>,
    /// Per-file summary fragments, in the same order.
    pub summaries: Vec<SummaryEntry>,
}

impl GeneratedReview {
    /// Render the aggregated summary comment body: the configured heading
    /// followed by one markdown bullet per file.
    pub fn aggregated_summary(&self, config: &VigilConfig) -> String {
        let mut out = format!("{}\n\n", config.review.summary_heading);
        for entry in &self.summaries {
            out.push_str(&format!("- **`{}`**\n\n  {}\n\n", entry.filename, entry.text));
        }
        out
    }
}

/// Map every file's comment candidates onto diff positions.
///
/// The position counter is per-file and sequential within a file; files are
/// independent of each other.
pub fn map_positions(review: &GeneratedReview) -> Vec<AnchoredComment> {
    review
        .files
        .iter()
        .flat_map(|f| position::anchor_comments(&f.filename, &f.patch, &f.comments))
        .collect()
}

/// Result of a single write to the hosting API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOutcome {
    /// What was being posted, e.g. `src/lib.rs:3` or `summary`.
    pub target: String,
    /// Failure reason, `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PostOutcome {
    fn ok(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            error: None,
        }
    }

    fn failed(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            error: Some(reason.into()),
        }
    }

    /// Whether this post succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Report of a completed publish pass.
///
/// Posting is best-effort: a failed comment is recorded here and does not
/// halt subsequent posts. The report drives the exit-code policy in the
/// binary.
///
/// # Examples
///
/// ```
/// use vigil_review::pipeline::RunReport;
///
/// let report = RunReport {
///     files_reviewed: 0,
///     comments_posted: 0,
///     summary_posted: false,
///     outcomes: vec![],
/// };
/// assert!(!report.has_failures());
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Number of files that were sent to the LLM.
    pub files_reviewed: usize,
    /// Inline comments successfully posted.
    pub comments_posted: usize,
    /// Whether the aggregated summary comment was posted.
    pub summary_posted: bool,
    /// Per-post outcomes, in posting order.
    pub outcomes: Vec<PostOutcome>,
}

impl RunReport {
    /// Number of posts that failed.
    pub fn post_failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    /// Whether any post failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_ok())
    }

    /// Render the report as markdown, suitable for a job summary.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_review::pipeline::RunReport;
    ///
    /// let report = RunReport {
    ///     files_reviewed: 0,
    ///     comments_posted: 0,
    ///     summary_posted: false,
    ///     outcomes: vec![],
    /// };
    /// let md = report.to_markdown();
    /// assert!(md.contains("# Review Run"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Review Run\n\n");
        out.push_str(&format!(
            "**Files:** {} | **Comments posted:** {} | **Failures:** {} | **Summary:** {}\n\n",
            self.files_reviewed,
            self.comments_posted,
            self.post_failures(),
            if self.summary_posted {
                "posted"
            } else {
                "not posted"
            },
        ));

        if !self.outcomes.is_empty() {
            for outcome in &self.outcomes {
                match &outcome.error {
                    None => out.push_str(&format!("- `{}` — ok\n", outcome.target)),
                    Some(reason) => {
                        out.push_str(&format!("- `{}` — **failed**: {reason}\n", outcome.target));
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Files: {} | Comments posted: {} | Failures: {} | Summary: {}",
            self.files_reviewed,
            self.comments_posted,
            self.post_failures(),
            if self.summary_posted { "posted" } else { "not posted" },
        )?;
        for outcome in &self.outcomes {
            match &outcome.error {
                None => writeln!(f, "  ok   {}", outcome.target)?,
                Some(reason) => writeln!(f, "  FAIL {}: {reason}", outcome.target)?,
            }
        }
        Ok(())
    }
}

/// Orchestrator for the fetch → generate → map → publish pipeline.
///
/// Fully sequential: one file at a time, one HTTP call at a time. The
/// position-counter logic is inherently per-file, so keeping generation
/// sequential also keeps the aggregated summary in listing order.
pub struct ReviewPipeline {
    llm: LlmClient,
    github: GithubClient,
    config: VigilConfig,
}

impl ReviewPipeline {
    /// Create a pipeline from the two clients and the loaded config.
    pub fn new(llm: LlmClient, github: GithubClient, config: VigilConfig) -> Self {
        Self {
            llm,
            github,
            config,
        }
    }

    /// Fetch the changed files of a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Github`] when the listing fails; nothing is
    /// posted in that case.
    pub async fn fetch(&self, repo: &str, pr_number: u64) -> Result<Vec<ChangedFile>, VigilError> {
        self.github.list_pr_files(repo, pr_number).await
    }

    /// Generate LLM feedback for every file with a non-empty patch.
    ///
    /// Files with an empty patch (binary files, pure renames) are skipped
    /// silently. Output order follows the input listing order.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Llm`] on the first failed LLM call; the run is
    /// aborted and no partial summary is posted.
    pub async fn generate(&self, files: &[ChangedFile]) -> Result<GeneratedReview, VigilError> {
        let reviewable: Vec<&ChangedFile> = files.iter().filter(|f| !f.patch.is_empty()).collect();

        let bar = ProgressBar::new(reviewable.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} reviewing {msg} [{pos}/{len}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut feedback = Vec::with_capacity(reviewable.len());
        let mut summaries = Vec::with_capacity(reviewable.len());

        for file in reviewable {
            bar.set_message(file.filename.clone());

            let messages = vec![
                ChatMessage {
                    role: Role::System,
                    content: prompt::build_system_prompt(&self.config.review),
                },
                ChatMessage {
                    role: Role::User,
                    content: prompt::build_file_prompt(&file.filename, &file.patch),
                },
            ];
            let response = self.llm.chat(messages).await?;
            let review = prompt::split_review(&response, &self.config.review, &file.filename);

            summaries.push(SummaryEntry {
                filename: file.filename.clone(),
                text: review.summary,
            });
            feedback.push(FileFeedback {
                filename: file.filename.clone(),
                patch: file.patch.clone(),
                comments: review.comments,
            });
            bar.inc(1);
        }
        bar.finish_and_clear();

        Ok(GeneratedReview {
            files: feedback,
            summaries,
        })
    }

    /// Publish anchored comments and the aggregated summary to the PR.
    ///
    /// Head-SHA lookup failure skips all inline comments; the summary is
    /// still attempted. Each comment post is independent: a failure is
    /// recorded and posting continues. This method itself never fails.
    pub async fn publish(&self, repo: &str, pr_number: u64, review: &GeneratedReview) -> RunReport {
        let anchored = map_positions(review);
        let mut outcomes = Vec::new();
        let mut comments_posted = 0;

        match self.github.pr_head_sha(repo, pr_number).await {
            Ok(sha) => {
                for comment in &anchored {
                    let target = format!("{}:{}", comment.filename, comment.position);
                    match self
                        .github
                        .post_review_comment(repo, pr_number, &sha, comment)
                        .await
                    {
                        Ok(()) => {
                            comments_posted += 1;
                            outcomes.push(PostOutcome::ok(target));
                        }
                        Err(e) => outcomes.push(PostOutcome::failed(target, e.to_string())),
                    }
                }
            }
            Err(e) => {
                outcomes.push(PostOutcome::failed(
                    "head-sha",
                    format!("inline comments skipped: {e}"),
                ));
            }
        }

        let summary_body = review.aggregated_summary(&self.config);
        let summary_posted = match self
            .github
            .post_issue_comment(repo, pr_number, &summary_body)
            .await
        {
            Ok(()) => {
                outcomes.push(PostOutcome::ok("summary"));
                true
            }
            Err(e) => {
                outcomes.push(PostOutcome::failed("summary", e.to_string()));
                false
            }
        };

        RunReport {
            files_reviewed: review.files.len(),
            comments_posted,
            summary_posted,
            outcomes,
        }
    }

    /// The config this pipeline was built with.
    pub fn config(&self) -> &VigilConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(filename: &str, patch: &str, comments: &[&str]) -> FileFeedback {
        FileFeedback {
            filename: filename.into(),
            patch: patch.into(),
            comments: comments.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn map_positions_spans_files_independently() {
        let review = GeneratedReview {
            files: vec![
                feedback("a.rs", "@@ -1,1 +1,2 @@\n keep\n+one", &["c1", "dropped"]),
                feedback("b.rs", "@@ -1,0 +1,1 @@\n+two", &["c2"]),
            ],
            summaries: vec![],
        };
        let anchored = map_positions(&review);
        assert_eq!(anchored.len(), 2);
        assert_eq!(anchored[0].filename, "a.rs");
        assert_eq!(anchored[0].position, 2);
        assert_eq!(anchored[0].body, "c1");
        // The comment index does not carry over between files.
        assert_eq!(anchored[1].filename, "b.rs");
        assert_eq!(anchored[1].position, 1);
        assert_eq!(anchored[1].body, "c2");
    }

    #[test]
    fn aggregated_summary_preserves_file_order() {
        let review = GeneratedReview {
            files: vec![],
            summaries: vec![
                SummaryEntry {
                    filename: "z.rs".into(),
                    text: "first listed".into(),
                },
                SummaryEntry {
                    filename: "a.rs".into(),
                    text: "second listed".into(),
                },
            ],
        };
        let body = review.aggregated_summary(&VigilConfig::default());
        assert!(body.starts_with("## Vigil review summary"));
        let z = body.find("z.rs").unwrap();
        let a = body.find("a.rs").unwrap();
        assert!(z < a, "summary bullets must follow listing order");
    }

    #[test]
    fn run_report_counts_failures() {
        let report = RunReport {
            files_reviewed: 2,
            comments_posted: 1,
            summary_posted: true,
            outcomes: vec![
                PostOutcome::ok("a.rs:2"),
                PostOutcome::failed("a.rs:3", "422 Unprocessable Entity"),
                PostOutcome::ok("summary"),
            ],
        };
        assert_eq!(report.post_failures(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn run_report_display_lists_outcomes() {
        let report = RunReport {
            files_reviewed: 1,
            comments_posted: 0,
            summary_posted: false,
            outcomes: vec![PostOutcome::failed("head-sha", "no sha")],
        };
        let text = format!("{report}");
        assert!(text.contains("FAIL head-sha"));
        assert!(text.contains("not posted"));
    }

    #[test]
    fn run_report_markdown_lists_outcomes() {
        let report = RunReport {
            files_reviewed: 2,
            comments_posted: 1,
            summary_posted: true,
            outcomes: vec![
                PostOutcome::ok("a.rs:2"),
                PostOutcome::failed("b.rs:5", "422 Unprocessable Entity"),
            ],
        };
        let md = report.to_markdown();
        assert!(md.contains("# Review Run"));
        assert!(md.contains("**Files:** 2"));
        assert!(md.contains("- `a.rs:2` — ok"));
        assert!(md.contains("**failed**: 422 Unprocessable Entity"));
    }

    #[test]
    fn clean_report_has_no_failures() {
        let report = RunReport {
            files_reviewed: 1,
            comments_posted: 1,
            summary_posted: true,
            outcomes: vec![PostOutcome::ok("a.rs:1"), PostOutcome::ok("summary")],
        };
        assert!(!report.has_failures());
        assert_eq!(report.post_failures(), 0);
    }
}
