//! Quiz session engine.
//!
//! A session is an ordered traversal of a view into the resident bank:
//! `view` holds indices into the bank slice, never copies of the
//! questions. Each question accepts exactly one answer; navigation is
//! bounds-checked and silent out of bounds; advancing past the last
//! question is the caller's cue to finish.
//!
//! Per-question outcomes flow through the injected `ResultSink`; a
//! session constructed with `NoopSink` records nothing.

use chrono::Utc;
use tracing::debug;

use crate::models::{Question, ResultRecord, SessionStats, SessionSummary};
use crate::router::ChapterSelector;

/// Receives one record per answered question. Implementations must not
/// fail the quiz flow; persistence errors stay inside the sink.
pub trait ResultSink: Send {
    fn record(&self, record: ResultRecord);
}

/// Absent capability, as an implementation rather than a runtime check.
pub struct NoopSink;

impl ResultSink for NoopSink {
    fn record(&self, _record: ResultRecord) {}
}

/// Outcome of the single answer accepted for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answered {
    pub selected: usize,
    pub is_correct: bool,
}

pub struct QuizSession {
    pub subject: String,
    pub selector: ChapterSelector,
    view: Vec<usize>,
    current: usize,
    answers: Vec<Option<Answered>>,
    stats: SessionStats,
    sink: Box<dyn ResultSink>,
}

impl QuizSession {
    pub fn start(
        subject: &str,
        selector: ChapterSelector,
        bank: &[Question],
        sink: Box<dyn ResultSink>,
    ) -> Self {
        let view: Vec<usize> = match selector {
            ChapterSelector::All => (0..bank.len()).collect(),
            ChapterSelector::Chapter(n) => bank
                .iter()
                .enumerate()
                .filter(|(_, q)| q.chapter == Some(n))
                .map(|(i, _)| i)
                .collect(),
        };
        debug!(subject, %selector, questions = view.len(), "Session started");
        let answers = vec![None; view.len()];
        Self {
            subject: subject.to_string(),
            selector,
            view,
            current: 0,
            answers,
            stats: SessionStats::default(),
            sink,
        }
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Zero-based position of the current question.
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.view.len()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn current_question<'a>(&self, bank: &'a [Question]) -> Option<&'a Question> {
        bank.get(*self.view.get(self.current)?)
    }

    /// The recorded answer for the current question, if any.
    pub fn current_answer(&self) -> Option<Answered> {
        self.answers.get(self.current).copied().flatten()
    }

    /// Submit an answer for the current question. The first submission
    /// locks the question; repeats are no-ops returning `None`.
    pub fn answer(&mut self, selected: usize, bank: &[Question]) -> Option<Answered> {
        if self.current_answer().is_some() {
            return None;
        }
        let question = self.current_question(bank)?;
        if selected >= question.options.len() {
            return None;
        }

        let selected_letter = (b'a' + selected as u8) as char;
        let is_correct = question
            .correct_option
            .trim()
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase() == selected_letter)
            .unwrap_or(false);

        self.stats.total += 1;
        if is_correct {
            self.stats.correct += 1;
        } else {
            self.stats.wrong += 1;
        }

        self.sink.record(ResultRecord {
            uid: format!("{}_{}", self.subject, self.current),
            text: question.question_text.clone(),
            explanation: question.explanation.clone(),
            options: question.options.clone(),
            timestamp: Utc::now().timestamp_millis(),
            is_correct,
            source: self.subject.clone(),
        });

        let answered = Answered {
            selected,
            is_correct,
        };
        self.answers[self.current] = Some(answered);
        Some(answered)
    }

    /// Bounds-checked move; out-of-bounds requests are silently ignored.
    pub fn nav(&mut self, delta: i64) {
        let target = self.current as i64 + delta;
        if target >= 0 && (target as usize) < self.view.len() {
            self.current = target as usize;
        }
    }

    /// Session aggregate. Skipped counts questions left unanswered, e.g.
    /// after backward navigation.
    pub fn finish(&self) -> SessionSummary {
        let total_questions = self.view.len() as u32;
        let skipped = total_questions - self.stats.total;
        let accuracy = if self.stats.total > 0 {
            (f64::from(self.stats.correct) / f64::from(self.stats.total) * 100.0).round() as u32
        } else {
            0
        };
        SessionSummary {
            subject: self.subject.clone(),
            correct: self.stats.correct,
            wrong: self.stats.wrong,
            skipped,
            total_questions,
            accuracy,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::RawBankQuestion;

    struct RecordingSink(Arc<Mutex<Vec<ResultRecord>>>);

    impl ResultSink for RecordingSink {
        fn record(&self, record: ResultRecord) {
            self.0.lock().expect("lock").push(record);
        }
    }

    fn bank() -> Vec<Question> {
        // Chapters: 1, 3, 3, 2; correct options: a, b, a, a
        [
            ("S_Ch1_001", "A"),
            ("S_Ch3_002", "B"),
            ("S_Ch3_003", "a"),
            ("S_Ch2_004", "A"),
        ]
        .iter()
        .map(|(id, correct)| {
            Question::from(RawBankQuestion {
                id: id.to_string(),
                question_text: format!("text {}", id),
                options: vec!["x".into(), "y".into(), "z".into()],
                correct_option: correct.to_string(),
                explanation: "because".to_string(),
                images: Vec::new(),
            })
        })
        .collect()
    }

    fn session(selector: ChapterSelector, bank: &[Question]) -> QuizSession {
        QuizSession::start("S", selector, bank, Box::new(NoopSink))
    }

    #[test]
    fn test_all_selector_takes_whole_bank() {
        let bank = bank();
        assert_eq!(session(ChapterSelector::All, &bank).len(), 4);
    }

    #[test]
    fn test_chapter_filter_includes_and_excludes() {
        let bank = bank();
        let s = session(ChapterSelector::Chapter(3), &bank);
        assert_eq!(s.len(), 2);
        assert_eq!(s.current_question(&bank).map(|q| q.id.as_str()), Some("S_Ch3_002"));

        assert_eq!(session(ChapterSelector::Chapter(4), &bank).len(), 0);
    }

    #[test]
    fn test_answer_accounting() {
        let bank = bank();
        let mut s = session(ChapterSelector::All, &bank);

        // Correct answer increments correct and total only
        let fb = s.answer(0, &bank).expect("first answer");
        assert!(fb.is_correct);
        assert_eq!(s.stats(), SessionStats { correct: 1, wrong: 0, total: 1 });

        // Second submission on the same question changes nothing
        assert!(s.answer(1, &bank).is_none());
        assert_eq!(s.stats(), SessionStats { correct: 1, wrong: 0, total: 1 });

        // Wrong answer increments wrong and total
        s.nav(1);
        let fb = s.answer(0, &bank).expect("answer"); // correct is B
        assert!(!fb.is_correct);
        assert_eq!(s.stats(), SessionStats { correct: 1, wrong: 1, total: 2 });
    }

    #[test]
    fn test_correctness_is_case_insensitive() {
        let bank = bank();
        let mut s = session(ChapterSelector::Chapter(3), &bank);
        s.nav(1); // S_Ch3_003, correct_option "a"
        let fb = s.answer(0, &bank).expect("answer");
        assert!(fb.is_correct);
    }

    #[test]
    fn test_nav_bounds() {
        let bank = bank();
        let mut s = session(ChapterSelector::All, &bank);

        s.nav(-1);
        assert_eq!(s.position(), 0);
        s.nav(10);
        assert_eq!(s.position(), 0);
        s.nav(1);
        assert_eq!(s.position(), 1);
        s.nav(2);
        assert_eq!(s.position(), 3);
        assert!(s.is_last());
        s.nav(1);
        assert_eq!(s.position(), 3);
    }

    #[test]
    fn test_finish_math() {
        // correct=7, wrong=2, answered=9, bank size=12
        let bank: Vec<Question> = (0..12)
            .map(|i| {
                Question::from(RawBankQuestion {
                    id: format!("S_Ch1_{:03}", i),
                    question_text: "q".to_string(),
                    options: vec!["x".into(), "y".into()],
                    correct_option: if i < 7 { "A" } else { "B" }.to_string(),
                    explanation: String::new(),
                    images: Vec::new(),
                })
            })
            .collect();

        let mut s = session(ChapterSelector::All, &bank);
        for _ in 0..9 {
            s.answer(0, &bank);
            s.nav(1);
        }

        let summary = s.finish();
        assert_eq!(summary.correct, 7);
        assert_eq!(summary.wrong, 2);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.accuracy, 78); // round(7/9*100)
    }

    #[test]
    fn test_finish_with_nothing_answered() {
        let bank = bank();
        let summary = session(ChapterSelector::All, &bank).finish();
        assert_eq!(summary.accuracy, 0);
        assert_eq!(summary.skipped, 4);
    }

    #[test]
    fn test_sink_receives_one_record_per_answer() {
        let bank = bank();
        let records = Arc::new(Mutex::new(Vec::new()));
        let mut s = QuizSession::start(
            "S",
            ChapterSelector::All,
            &bank,
            Box::new(RecordingSink(Arc::clone(&records))),
        );

        s.answer(2, &bank);
        s.answer(1, &bank); // locked, not recorded
        s.nav(1);
        s.answer(1, &bank);

        let records = records.lock().expect("lock");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].uid, "S_0");
        assert_eq!(records[1].uid, "S_1");
        assert!(records[1].is_correct);
        assert_eq!(records[0].source, "S");
    }
}
