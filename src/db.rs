//! Local result persistence.
//!
//! The result log and global stats live as JSON files in the data
//! directory. The log is small and local, so last-write-wins per uid is
//! a full load-filter-append-save pass. Write failures never interrupt
//! the quiz flow: `DbResultSink` swallows them with a warning.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::{GlobalStats, ResultRecord, SessionStats};
use crate::session::ResultSink;

const RESULTS_FILE: &str = "results.json";
const STATS_FILE: &str = "global_stats.json";

#[derive(Clone)]
pub struct Db {
    dir: PathBuf,
}

impl Db {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir).context("Failed to create data directory")?;
        Ok(Self { dir })
    }

    fn results_path(&self) -> PathBuf {
        self.dir.join(RESULTS_FILE)
    }

    fn stats_path(&self) -> PathBuf {
        self.dir.join(STATS_FILE)
    }

    /// The full persisted log. Missing or unreadable files read as empty.
    pub fn load_results(&self) -> Vec<ResultRecord> {
        let path = self.results_path();
        if !path.exists() {
            return Vec::new();
        }
        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str(&s).map_err(Into::into))
        {
            Ok(records) => records,
            Err(e) => {
                debug!(error = %e, "Unreadable result log, starting empty");
                Vec::new()
            }
        }
    }

    /// Append one record, replacing any prior record with the same uid.
    pub fn save_result(&self, record: ResultRecord) -> Result<()> {
        let mut log = self.load_results();
        log.retain(|r| r.uid != record.uid);
        log.push(record);
        let contents = serde_json::to_string(&log)?;
        std::fs::write(self.results_path(), contents).context("Failed to write result log")?;
        Ok(())
    }

    pub fn load_stats(&self) -> GlobalStats {
        let path = self.stats_path();
        if !path.exists() {
            return GlobalStats::default();
        }
        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str(&s).map_err(Into::into))
        {
            Ok(stats) => stats,
            Err(e) => {
                debug!(error = %e, "Unreadable global stats, starting fresh");
                GlobalStats::default()
            }
        }
    }

    /// Fold one finished session into the global counters. Additive,
    /// never overwritten.
    pub fn merge_session(&self, stats: &SessionStats) -> Result<GlobalStats> {
        let mut global = self.load_stats();
        global.total_answered += stats.total;
        global.total_correct += stats.correct;
        global.quizzes_taken += 1;
        let contents = serde_json::to_string(&global)?;
        std::fs::write(self.stats_path(), contents).context("Failed to write global stats")?;
        Ok(global)
    }

    /// Remove all persisted state. Full-reset only.
    pub fn clear(&self) -> Result<()> {
        for path in [self.results_path(), self.stats_path()] {
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// The persistence-backed result sink. A rejected write is logged and
/// dropped; the session never sees it.
pub struct DbResultSink {
    db: Db,
}

impl DbResultSink {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

impl ResultSink for DbResultSink {
    fn record(&self, record: ResultRecord) {
        if let Err(e) = self.db.save_result(record) {
            warn!(error = %e, "Failed to persist result");
        }
    }
}
