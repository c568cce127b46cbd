use vigil_core::AnchoredComment;

/// Anchor review comments to positions within a file's patch text.
///
/// Reproduces GitHub's diff-position addressing: the position is a 1-based
/// counter that advances once for every line of the patch (context, added,
/// and removed lines alike) and resets to 1 at each `@@` hunk header. The
/// header line itself is not commentable.
///
/// Comments are consumed positionally by occurrence: the Nth added line in
/// the patch, counted across all hunks without resetting, receives the Nth
/// comment. Surplus comments are dropped; surplus added lines receive no
/// comment.
///
/// # Examples
///
/// ```
/// use vigil_review::position::anchor_comments;
///
/// let patch = "@@ -1,2 +1,3 @@\n context\n+added";
/// let anchored = anchor_comments("src/lib.rs", patch, &["tighten this".into()]);
/// assert_eq!(anchored.len(), 1);
/// assert_eq!(anchored[0].position, 2);
/// ```
pub fn anchor_comments(
    filename: &str,
    patch: &str,
    comments: &[String],
) -> Vec<AnchoredComment> {
    let mut anchored = Vec::new();
    let mut position: u32 = 0;
    let mut comment_index = 0;

    for line in patch.split('\n') {
        if line.starts_with("@@") {
            // The header sits at offset 0 of its hunk and is not commentable;
            // the first content line after it lands at position 1.
            position = 0;
            continue;
        }
        position += 1;

        if line.starts_with('+') && comment_index < comments.len() {
            anchored.push(AnchoredComment {
                filename: filename.to_string(),
                position,
                body: comments[comment_index].clone(),
            });
            comment_index += 1;
        }
    }

    anchored
}

/// Parse the new-side start line from a hunk header (`@@ -a,b +c,d @@`).
///
/// Tolerant by design: a malformed header yields `None` without affecting
/// the position counter, which never depends on the parsed value. Used only
/// for diagnostics.
///
/// # Examples
///
/// ```
/// use vigil_review::position::parse_hunk_header;
///
/// assert_eq!(parse_hunk_header("@@ -1,2 +10,3 @@"), Some(10));
/// assert_eq!(parse_hunk_header("@@ -5 +6 @@ fn main()"), Some(6));
/// assert_eq!(parse_hunk_header("@@ garbage @@"), None);
/// ```
pub fn parse_hunk_header(line: &str) -> Option<u32> {
    let new_range = line
        .strip_prefix("@@ ")?
        .split(" @@")
        .next()?
        .split(' ')
        .find_map(|part| part.strip_prefix('+'))?;

    let start = match new_range.split_once(',') {
        Some((start, _count)) => start,
        None => new_range,
    };
    start.parse().ok()
}

/// Count the added lines in a patch (lines starting with `+` outside hunk
/// headers). Equals the maximum number of comments that can be anchored.
pub fn count_added_lines(patch: &str) -> usize {
    patch
        .split('\n')
        .filter(|line| !line.starts_with("@@") && line.starts_with('+'))
        .count()
}
