//! Question bank entities.
//!
//! Bank files on disk embed the chapter number inside the question id
//! (`Anatomy_Ch3_017`). That convention is parsed once at load time into
//! the explicit `chapter` field; nothing downstream re-parses the id.

use serde::{Deserialize, Serialize};

/// A question as it appears in a per-subject bank file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBankQuestion {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_option: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A loaded question with chapter membership resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub chapter: Option<u32>,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_option: String,
    pub explanation: String,
    pub images: Vec<String>,
}

impl From<RawBankQuestion> for Question {
    fn from(raw: RawBankQuestion) -> Self {
        let chapter = chapter_from_id(&raw.id);
        Self {
            id: raw.id,
            chapter,
            question_text: raw.question_text,
            options: raw.options,
            correct_option: raw.correct_option,
            explanation: raw.explanation,
            images: raw.images,
        }
    }
}

impl Question {
    /// Zero-based index of the correct option, from the stored letter.
    /// Case-insensitive; `None` if the letter is missing or out of range.
    pub fn correct_index(&self) -> Option<usize> {
        let letter = self.correct_option.trim().chars().next()?;
        let idx = (letter.to_ascii_lowercase() as usize).checked_sub('a' as usize)?;
        (idx < self.options.len()).then_some(idx)
    }
}

/// Parse the `_Ch<N>_` marker out of a question id.
pub fn chapter_from_id(id: &str) -> Option<u32> {
    let start = id.find("_Ch")? + 3;
    let rest = &id[start..];
    let end = rest.find('_')?;
    rest[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, options: usize, correct: &str) -> Question {
        Question::from(RawBankQuestion {
            id: id.to_string(),
            question_text: "q".to_string(),
            options: (0..options).map(|i| format!("opt {}", i)).collect(),
            correct_option: correct.to_string(),
            explanation: String::new(),
            images: Vec::new(),
        })
    }

    #[test]
    fn test_chapter_from_id() {
        assert_eq!(chapter_from_id("Anatomy_Ch3_017"), Some(3));
        assert_eq!(chapter_from_id("Surgery_Ch12_001"), Some(12));
        assert_eq!(chapter_from_id("NoMarkerHere"), None);
        assert_eq!(chapter_from_id("Broken_ChX_1"), None);
        assert_eq!(chapter_from_id("Trailing_Ch4"), None);
    }

    #[test]
    fn test_migration_sets_chapter() {
        assert_eq!(question("Anatomy_Ch3_017", 4, "A").chapter, Some(3));
        assert_eq!(question("odd-id", 4, "A").chapter, None);
    }

    #[test]
    fn test_correct_index_case_insensitive() {
        assert_eq!(question("x_Ch1_0", 4, "C").correct_index(), Some(2));
        assert_eq!(question("x_Ch1_0", 4, "c").correct_index(), Some(2));
        assert_eq!(question("x_Ch1_0", 2, "D").correct_index(), None);
        assert_eq!(question("x_Ch1_0", 2, "").correct_index(), None);
    }
}
