//! In-memory data layer over the fetch service.
//!
//! Holds the subject registry and syllabus loaded at startup plus the
//! memory-resident question banks. Bank entries are created on first
//! access and never invalidated for the lifetime of the process; the
//! residency check is what gates router-triggered fetches.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::fetch::FetchHandle;
use crate::models::{Question, RawBankQuestion, Subject, Syllabus};

use super::normalize::{normalize_quiz, QuizDoc};

/// Subject-name spelling variants that share one syllabus entry.
/// Lookup falls back across each pair in both directions.
const SPELLING_VARIANTS: &[(&str, &str)] = &[
    ("Paediatrics", "Pediatrics"),
    ("Orthopaedics", "Orthopedics"),
    ("Anaesthesia", "Anesthesia"),
];

pub struct DataStore {
    fetch: FetchHandle,
    origin: String,
    pub subjects: Vec<Subject>,
    pub syllabus: Syllabus,
    banks: HashMap<String, Vec<Question>>,
    quiz_files: HashMap<String, QuizDoc>,
}

impl DataStore {
    pub fn new(fetch: FetchHandle, origin: String) -> Self {
        Self {
            fetch,
            origin,
            subjects: Vec::new(),
            syllabus: Syllabus::new(),
            banks: HashMap::new(),
            quiz_files: HashMap::new(),
        }
    }

    fn data_url(&self, file: &str) -> String {
        format!("{}/data/{}", self.origin, file)
    }

    pub fn subjects_url(&self) -> String {
        self.data_url("subjects.json")
    }

    pub fn syllabus_url(&self) -> String {
        self.data_url("syllabus.json")
    }

    /// Load the subject registry and syllabus in parallel. Failure of
    /// either is fatal to startup; there is no partial mode.
    pub async fn init(&mut self) -> Result<()> {
        let subjects_url = self.subjects_url();
        let syllabus_url = self.syllabus_url();
        let (subjects, syllabus) = tokio::join!(
            self.fetch.get(&subjects_url),
            self.fetch.get(&syllabus_url),
        );

        let subjects = subjects.context("Could not load subject registry")?;
        let syllabus = syllabus.context("Could not load syllabus")?;

        self.subjects =
            serde_json::from_slice(&subjects).context("Malformed subjects.json")?;
        self.syllabus =
            serde_json::from_slice(&syllabus).context("Malformed syllabus.json")?;

        info!(subjects = self.subjects.len(), "Library loaded");
        Ok(())
    }

    pub fn is_resident(&self, name: &str) -> bool {
        self.banks.contains_key(name)
    }

    pub fn bank(&self, name: &str) -> Option<&[Question]> {
        self.banks.get(name).map(Vec::as_slice)
    }

    /// Load one subject's question bank. A no-op when already resident,
    /// so repeated calls perform no additional fetch.
    pub async fn load_subject(&mut self, name: &str) -> Result<()> {
        if self.is_resident(name) {
            debug!(subject = name, "Bank already resident");
            return Ok(());
        }

        let file = self
            .subjects
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.file.clone())
            .unwrap_or_else(|| format!("{}.json", name));

        let body = self
            .fetch
            .get(&self.data_url(&file))
            .await
            .with_context(|| format!("Error loading: {}", file))?;

        let raw: Vec<RawBankQuestion> =
            serde_json::from_slice(&body).with_context(|| format!("Malformed bank: {}", file))?;

        let bank: Vec<Question> = raw.into_iter().map(Question::from).collect();
        info!(subject = name, questions = bank.len(), "Bank loaded");
        self.banks.insert(name.to_string(), bank);
        Ok(())
    }

    /// Chapter titles for a subject, falling back across known spelling
    /// variants. Missing subjects get an empty list, not an error.
    pub fn chapters_for(&self, name: &str) -> &[String] {
        if let Some(chapters) = self.syllabus.get(name) {
            return chapters;
        }
        for (a, b) in SPELLING_VARIANTS {
            let other = if name == *a {
                *b
            } else if name == *b {
                *a
            } else {
                continue;
            };
            if let Some(chapters) = self.syllabus.get(other) {
                return chapters;
            }
        }
        &[]
    }

    /// Load a quiz file from the manifest directory, normalizing its
    /// question and option shapes. Memory-cached like the banks.
    pub async fn load_quiz_file(&mut self, filename: &str) -> Result<&QuizDoc> {
        if !self.quiz_files.contains_key(filename) {
            let url = format!("{}/quiz_data/{}", self.origin, filename);
            let body = self
                .fetch
                .get(&url)
                .await
                .with_context(|| format!("Error loading: {}", filename))?;
            let raw: Value = serde_json::from_slice(&body)
                .with_context(|| format!("Malformed quiz file: {}", filename))?;
            self.quiz_files
                .insert(filename.to_string(), normalize_quiz(&raw));
        }
        // Inserted above when absent
        Ok(&self.quiz_files[filename])
    }

    /// Ordered list of quiz files available in manifest mode.
    pub async fn load_manifest(&mut self) -> Result<Vec<String>> {
        let url = format!("{}/quiz_manifest.json", self.origin);
        let body = self
            .fetch
            .get(&url)
            .await
            .context("Could not load quiz manifest")?;
        serde_json::from_slice(&body).context("Malformed quiz manifest")
    }
}
