/// Case-insensitive substring check, used by the subject search.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Turn a quiz-file name into a display title: drop the extension, the
/// leading numeric prefix, and underscores. `03_Renal_System.json`
/// becomes `Renal System`.
pub fn format_title(raw_name: &str) -> String {
    let name = raw_name.trim_end_matches(".json");
    let name = name.trim_start_matches(|c: char| c.is_ascii_digit());
    let name = name.trim_start_matches(['_', '-', ' ']);
    name.replace('_', " ")
}

/// Minimal input normalization at the render boundary. The full
/// character-substitution table lives with the data pipeline; only the
/// arrow shorthand common in explanations is handled here.
pub fn clean_text(text: &str) -> String {
    text.replace("->", "\u{2192}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Forensic Medicine", "med"));
        assert!(contains_ignore_case("Anatomy", "ANA"));
        assert!(!contains_ignore_case("Anatomy", "surg"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a longer string", 9), "a long...");
    }

    #[test]
    fn test_format_title() {
        assert_eq!(format_title("03_Renal_System.json"), "Renal System");
        assert_eq!(format_title("Cardio.json"), "Cardio");
        assert_eq!(format_title("12 - Endocrine.json"), "Endocrine");
    }

    #[test]
    fn test_clean_text_arrow() {
        assert_eq!(clean_text("A -> B"), "A \u{2192} B");
    }
}
