//! Shape normalization for manifest-driven quiz files.
//!
//! Quiz files collected from different sources disagree on shape: the
//! question may be a string or an object with a `text` property, the
//! options a sequence or a keyed mapping, each option a bare string or
//! an object. Normalization is total: every legal input shape produces
//! the canonical `{text, correct}` form without error.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct QuizDoc {
    pub title: Option<String>,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub text: String,
    pub options: Vec<OptionEntry>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    pub text: String,
    pub correct: bool,
}

pub fn normalize_quiz(raw: &Value) -> QuizDoc {
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);
    let questions = raw
        .get("questions")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(normalize_question).collect())
        .unwrap_or_default();
    QuizDoc { title, questions }
}

fn normalize_question(v: &Value) -> QuizQuestion {
    let text = match v.get("question") {
        // Object form wins; an object without `text` is stringified
        Some(Value::Object(m)) => m
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Value::Object(m.clone()).to_string()),
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(other) if !other.is_null() => value_text(other),
        _ => v
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    };

    let options = match v.get("options") {
        Some(Value::Array(items)) => items.iter().map(normalize_option).collect(),
        // Keyed mapping: flatten to values in insertion order
        // (serde_json preserve_order keeps the document order)
        Some(Value::Object(map)) => map.values().map(normalize_option).collect(),
        _ => Vec::new(),
    };

    let explanation = v
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::to_string);

    QuizQuestion {
        text,
        options,
        explanation,
    }
}

fn normalize_option(v: &Value) -> OptionEntry {
    match v {
        Value::String(s) => OptionEntry {
            text: s.clone(),
            correct: false,
        },
        Value::Object(m) => OptionEntry {
            text: m
                .get("text")
                .and_then(Value::as_str)
                .or_else(|| m.get("value").and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(m.clone()).to_string()),
            correct: m.get("correct").and_then(Value::as_bool).unwrap_or(false),
        },
        other => OptionEntry {
            text: value_text(other),
            correct: false,
        },
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_question_and_string_options() {
        let doc = normalize_quiz(&json!({
            "questions": [
                { "question": "2+2?", "options": ["3", "4"] }
            ]
        }));
        assert_eq!(doc.questions.len(), 1);
        let q = &doc.questions[0];
        assert_eq!(q.text, "2+2?");
        assert_eq!(
            q.options,
            vec![
                OptionEntry { text: "3".into(), correct: false },
                OptionEntry { text: "4".into(), correct: false },
            ]
        );
    }

    #[test]
    fn test_object_question_wins_over_text_field() {
        let doc = normalize_quiz(&json!({
            "questions": [
                { "question": { "text": "From object" }, "text": "ignored" }
            ]
        }));
        assert_eq!(doc.questions[0].text, "From object");
    }

    #[test]
    fn test_object_question_without_text_is_stringified() {
        let doc = normalize_quiz(&json!({
            "questions": [ { "question": { "stem": "odd" } } ]
        }));
        assert_eq!(doc.questions[0].text, r#"{"stem":"odd"}"#);
    }

    #[test]
    fn test_keyed_options_flatten_in_insertion_order() {
        let doc = normalize_quiz(&json!({
            "questions": [
                { "question": "pick", "options": { "b": "second?", "a": "first?" } }
            ]
        }));
        let texts: Vec<_> = doc.questions[0]
            .options
            .iter()
            .map(|o| o.text.as_str())
            .collect();
        assert_eq!(texts, vec!["second?", "first?"]);
    }

    #[test]
    fn test_object_options_keep_correct_and_value() {
        let doc = normalize_quiz(&json!({
            "questions": [
                { "question": "q", "options": [
                    { "text": "yes", "correct": true },
                    { "value": "no" }
                ]}
            ]
        }));
        assert_eq!(
            doc.questions[0].options,
            vec![
                OptionEntry { text: "yes".into(), correct: true },
                OptionEntry { text: "no".into(), correct: false },
            ]
        );
    }

    #[test]
    fn test_degenerate_shapes_do_not_error() {
        // Missing everything
        let doc = normalize_quiz(&json!({ "questions": [ {} ] }));
        assert_eq!(doc.questions[0].text, "");
        assert!(doc.questions[0].options.is_empty());

        // Numeric question, mixed option shapes
        let doc = normalize_quiz(&json!({
            "questions": [
                { "question": 42, "options": ["a", 7, null, { "x": 1 }] }
            ]
        }));
        assert_eq!(doc.questions[0].text, "42");
        assert_eq!(doc.questions[0].options.len(), 4);

        // No questions field at all
        assert!(normalize_quiz(&json!({})).questions.is_empty());
    }
}
