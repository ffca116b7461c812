//! Subject registry and syllabus types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry of `subjects.json`. The name doubles as the routing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub file: String,
}

/// `syllabus.json`: subject name to ordered chapter titles.
/// Chapter numbers are positional (index + 1).
pub type Syllabus = HashMap<String, Vec<String>>;
