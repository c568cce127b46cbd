use std::collections::HashSet;

use vigil_core::ReviewConfig;

/// Parsed LLM feedback for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReview {
    /// Inline comment candidates, deduplicated, in first-occurrence order.
    pub comments: Vec<String>,
    /// Per-file summary fragment.
    pub summary: String,
}

/// Build the system prompt describing the reviewer persona and output shape.
///
/// The configured summary delimiter is embedded so the response can be split
/// back into inline comments and a summary.
///
/// # Examples
///
/// ```
/// use vigil_core::ReviewConfig;
/// use vigil_review::prompt::build_system_prompt;
///
/// let prompt = build_system_prompt(&ReviewConfig::default());
/// assert!(prompt.contains("---SUMMARY---"));
/// ```
pub fn build_system_prompt(config: &ReviewConfig) -> String {
    format!(
        "You are an expert code reviewer examining one file of a pull request at a time.\n\
         \n\
         Rules:\n\
         - Comment only on the added lines of the patch (lines starting with +)\n\
         - Write one inline comment per line of output, ordered to match the added\n\
           lines of the patch from top to bottom\n\
         - Focus on bugs, security issues, and logic errors; skip style nitpicks\n\
         - Keep each comment short and specific\n\
         - If an added line needs no comment, write nothing for it\n\
         \n\
         After the inline comments, write the line {delim} on its own, followed by\n\
         a two-to-three sentence summary of the change.",
        delim = config.summary_delimiter
    )
}

/// Build the user prompt embedding the filename and full patch text.
///
/// # Examples
///
/// ```
/// use vigil_review::prompt::build_file_prompt;
///
/// let prompt = build_file_prompt("src/lib.rs", "+new line");
/// assert!(prompt.contains("src/lib.rs"));
/// assert!(prompt.contains("+new line"));
/// ```
pub fn build_file_prompt(filename: &str, patch: &str) -> String {
    format!("Review the changes to `{filename}`:\n\n```diff\n{patch}\n```\n")
}

/// Split a raw LLM response into inline comment candidates and a summary.
///
/// The text is split on the first occurrence of the configured delimiter:
/// everything before it becomes comment candidates, everything after is the
/// summary. When the delimiter is absent, the whole response is treated as
/// candidates and the summary falls back to the configured template.
///
/// Candidates are the non-blank lines, deduplicated by exact content in
/// first-occurrence order and truncated to `max_comments_per_file`.
///
/// # Examples
///
/// ```
/// use vigil_core::ReviewConfig;
/// use vigil_review::prompt::split_review;
///
/// let config = ReviewConfig::default();
/// let review = split_review("fix this\n---SUMMARY---\nlooks fine", &config, "a.rs");
/// assert_eq!(review.comments, vec!["fix this"]);
/// assert_eq!(review.summary, "looks fine");
/// ```
pub fn split_review(raw: &str, config: &ReviewConfig, filename: &str) -> FileReview {
    let (comment_text, summary) = match raw.split_once(&config.summary_delimiter) {
        Some((before, after)) => (before, after.trim().to_string()),
        None => (
            raw,
            config.fallback_summary.replace("{filename}", filename),
        ),
    };

    let mut seen = HashSet::new();
    let mut comments: Vec<String> = Vec::new();
    for line in comment_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if seen.insert(line.to_string()) {
            comments.push(line.to_string());
        }
    }
    comments.truncate(config.max_comments_per_file);

    FileReview { comments, summary }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_embeds_delimiter() {
        let config = ReviewConfig {
            summary_delimiter: "===END===".into(),
            ..ReviewConfig::default()
        };
        let prompt = build_system_prompt(&config);
        assert!(prompt.contains("===END==="));
        assert!(prompt.contains("added lines"));
    }

    #[test]
    fn file_prompt_includes_diff_fence() {
        let prompt = build_file_prompt("src/main.rs", "@@ -1 +1 @@\n+x");
        assert!(prompt.contains("```diff"));
        assert!(prompt.contains("@@ -1 +1 @@"));
    }

    #[test]
    fn splits_on_first_delimiter_occurrence() {
        let config = ReviewConfig::default();
        let raw = "comment one\ncomment two\n---SUMMARY---\nfirst part\n---SUMMARY---\nsecond";
        let review = split_review(raw, &config, "a.rs");
        assert_eq!(review.comments, vec!["comment one", "comment two"]);
        // Everything after the FIRST delimiter is summary, delimiter included.
        assert!(review.summary.starts_with("first part"));
        assert!(review.summary.contains("---SUMMARY---"));
    }

    #[test]
    fn missing_delimiter_uses_fallback_summary() {
        let config = ReviewConfig::default();
        let review = split_review("only comments here", &config, "src/lib.rs");
        assert_eq!(review.comments, vec!["only comments here"]);
        assert!(review.summary.contains("src/lib.rs"));
        assert!(!review.summary.contains("{filename}"));
    }

    #[test]
    fn blank_and_duplicate_lines_are_collapsed() {
        let config = ReviewConfig::default();
        let raw = "fix the loop\n\n  \nfix the loop\ncheck bounds\n---SUMMARY---\nok";
        let review = split_review(raw, &config, "a.rs");
        assert_eq!(review.comments, vec!["fix the loop", "check bounds"]);
    }

    #[test]
    fn candidates_are_truncated_to_limit() {
        let config = ReviewConfig {
            max_comments_per_file: 2,
            ..ReviewConfig::default()
        };
        let raw = "one\ntwo\nthree\nfour";
        let review = split_review(raw, &config, "a.rs");
        assert_eq!(review.comments.len(), 2);
        assert_eq!(review.comments, vec!["one", "two"]);
    }

    #[test]
    fn empty_response_yields_no_candidates() {
        let config = ReviewConfig::default();
        let review = split_review("", &config, "a.rs");
        assert!(review.comments.is_empty());
        assert!(review.summary.contains("a.rs"));
    }

    #[test]
    fn summary_is_trimmed() {
        let config = ReviewConfig::default();
        let review = split_review("c\n---SUMMARY---\n\n  tidy change  \n", &config, "a.rs");
        assert_eq!(review.summary, "tidy change");
    }
}
