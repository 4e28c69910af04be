//! Extraction post-processing: frame joining and word-budget
//! truncation.

/// Separator placed between per-frame texts when a page has content
/// in more than one frame.
pub const FRAME_SEPARATOR: &str = "\n\n---\n\n";

/// Cached text is cut off at this many words. Pages routinely exceed
/// it; the marker appended on truncation lets consumers report it.
pub const DEFAULT_WORD_LIMIT: usize = 3500;

/// Join the non-empty frame results of an extraction into one text.
pub fn join_frames(frames: &[Option<String>]) -> String {
    let parts: Vec<&str> = frames
        .iter()
        .filter_map(|frame| frame.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();
    parts.join(FRAME_SEPARATOR)
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate to `limit` words, appending a marker naming how much was
/// kept. Text at or under the limit passes through unchanged.
pub fn truncate_to_word_limit(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let total = words.len();
    if total <= limit {
        return text.to_string();
    }
    let mut out = words[..limit].join(" ");
    out.push_str(&format!(
        "\n\n[Content truncated - showing first {limit} words of {total} total words]"
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_skips_empty_frames() {
        let frames = vec![
            Some("main frame".to_string()),
            None,
            Some("   ".to_string()),
            Some("iframe text".to_string()),
        ];
        assert_eq!(join_frames(&frames), "main frame\n\n---\n\niframe text");
    }

    #[test]
    fn test_join_single_frame_has_no_separator() {
        let frames = vec![Some(" hello ".to_string())];
        assert_eq!(join_frames(&frames), "hello");
    }

    #[test]
    fn test_join_all_empty() {
        assert_eq!(join_frames(&[None, None]), "");
        assert_eq!(join_frames(&[]), "");
    }

    #[test]
    fn test_truncate_under_limit_unchanged() {
        let text = "one two three";
        assert_eq!(truncate_to_word_limit(text, 10), text);
        assert_eq!(truncate_to_word_limit(text, 3), text);
    }

    #[test]
    fn test_truncate_over_limit_appends_marker() {
        let words: Vec<String> = (0..4000).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let truncated = truncate_to_word_limit(&text, DEFAULT_WORD_LIMIT);
        assert!(truncated.contains(
            "[Content truncated - showing first 3500 words of 4000 total words]"
        ));
        // The kept prefix ends exactly at the budget
        assert!(truncated.starts_with("w0 w1 "));
        assert!(truncated.contains("w3499\n\n[Content truncated"));
        assert!(!truncated.contains("w3500 "));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  a  b\nc\t"), 3);
    }
}
