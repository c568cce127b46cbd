use serde::{Deserialize, Serialize};

/// A file changed in a pull request, as returned by the GitHub files listing.
///
/// `patch` is the unified-diff hunk text for the file and may be empty for
/// binary files or pure renames. Large patches may be truncated by the API;
/// they are passed through as-is.
///
/// # Examples
///
/// ```
/// use vigil_core::ChangedFile;
///
/// let file = ChangedFile {
///     filename: "src/lib.rs".into(),
///     patch: "@@ -1,2 +1,3 @@\n context\n+added".into(),
/// };
/// assert!(!file.patch.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    /// Path of the file within the repository.
    pub filename: String,
    /// Unified-diff hunk text, possibly empty.
    pub patch: String,
}

/// An inline review comment anchored to a diff position.
///
/// `position` follows GitHub's review-comment addressing scheme: a 1-based
/// counter over the lines of the file's patch text that resets at each hunk
/// header. It is distinct from the absolute line number in the file.
///
/// # Examples
///
/// ```
/// use vigil_core::AnchoredComment;
///
/// let comment = AnchoredComment {
///     filename: "src/lib.rs".into(),
///     position: 2,
///     body: "This unwrap can panic".into(),
/// };
/// assert_eq!(comment.position, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchoredComment {
    /// Path of the file being commented on.
    pub filename: String,
    /// 1-based offset within the file's patch text, per-hunk-resetting.
    pub position: u32,
    /// Comment body.
    pub body: String,
}

/// A per-file summary fragment, aggregated into one composite comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    /// Path of the reviewed file.
    pub filename: String,
    /// Summary text for that file.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_file_serializes_camel_case() {
        let file = ChangedFile {
            filename: "a.rs".into(),
            patch: String::new(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert!(json.get("filename").is_some());
        assert!(json.get("patch").is_some());
    }

    #[test]
    fn anchored_comment_round_trips() {
        let comment = AnchoredComment {
            filename: "src/main.rs".into(),
            position: 3,
            body: "check this".into(),
        };
        let json = serde_json::to_string(&comment).unwrap();
        let back: AnchoredComment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, comment);
    }
}
