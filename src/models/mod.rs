//! Data models for the quiz application.
//!
//! - `Subject`, `Syllabus`: the static registry loaded at startup
//! - `Question`: a bank question with resolved chapter membership
//! - `ResultRecord`, `GlobalStats`: persisted outcome types
//! - `SessionStats`, `SessionSummary`: in-session counters

pub mod question;
pub mod result;
pub mod subject;

pub use question::{chapter_from_id, Question, RawBankQuestion};
pub use result::{GlobalStats, ResultRecord, SessionStats, SessionSummary};
pub use subject::{Subject, Syllabus};
