//! Data access layer: startup registry loads, memory-resident question
//! banks, and shape normalization for manifest-driven quiz files.

pub mod normalize;
pub mod store;

pub use normalize::{OptionEntry, QuizDoc, QuizQuestion};
pub use store::DataStore;
