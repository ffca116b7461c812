use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Version tag of the active cache generation. Bump on every change to
/// the install manifest: activation then purges every older generation
/// and the shell is re-fetched.
pub const CACHE_GENERATION: &str = "qbank-core-v3";

/// Marker file written after a successful install.
const INSTALL_MARKER: &str = ".installed";

/// One cached resource: the URL it answers, when it was fetched, and the
/// response body. Stored as a single file so every write is one put.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub body: Vec<u8>,
}

impl StoredResponse {
    pub fn new(url: &str, body: Vec<u8>) -> Self {
        Self {
            url: url.to_string(),
            fetched_at: Utc::now(),
            body,
        }
    }
}

/// On-disk resource store, one directory per cache generation.
///
/// The store never reaches the network itself; callers hand it fetched
/// bodies. It is shared between the main application and the fetch
/// service, so all mutations are single self-contained file operations.
pub struct ResourceStore {
    root: PathBuf,
    generation: String,
}

impl ResourceStore {
    pub fn new(root: PathBuf, generation: &str) -> Result<Self> {
        std::fs::create_dir_all(root.join(generation))
            .with_context(|| format!("Failed to create cache generation {}", generation))?;
        Ok(Self {
            root,
            generation: generation.to_string(),
        })
    }

    /// Directory holding every generation. A store opened on the same
    /// root after `wipe_all` starts a fresh active generation.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generation_dir(&self) -> PathBuf {
        self.root.join(&self.generation)
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.generation_dir().join(entry_name(url))
    }

    /// Read and validate the entry for a URL. Unreadable files are a
    /// miss; so is an entry whose recorded URL differs from the request,
    /// since derived file names can collide across URLs and only the
    /// envelope's URL is the entry's identity.
    fn read_entry(&self, url: &str) -> Option<StoredResponse> {
        let path = self.entry_path(url);
        if !path.exists() {
            return None;
        }
        let stored = match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str::<StoredResponse>(&s).map_err(Into::into))
        {
            Ok(stored) => stored,
            Err(e) => {
                debug!(url, error = %e, "Unreadable cache entry, treating as miss");
                return None;
            }
        };
        if stored.url != url {
            debug!(url, entry = %stored.url, "Entry name collision, treating as miss");
            return None;
        }
        Some(stored)
    }

    /// Look a URL up in the active generation.
    pub fn lookup(&self, url: &str) -> Option<Vec<u8>> {
        self.read_entry(url).map(|stored| stored.body)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.read_entry(url).is_some()
    }

    /// Store one URL's response. A single write; replaces any prior entry.
    pub fn put(&self, url: &str, body: &[u8]) -> Result<()> {
        let stored = StoredResponse::new(url, body.to_vec());
        let contents = serde_json::to_string(&stored)?;
        std::fs::write(self.entry_path(url), contents)
            .with_context(|| format!("Failed to write cache entry for {}", url))?;
        Ok(())
    }

    /// Remove one URL's entry. Returns whether an entry existed; an
    /// entry recorded for a different URL is left untouched.
    pub fn remove(&self, url: &str) -> Result<bool> {
        if self.read_entry(url).is_none() {
            return Ok(false);
        }
        std::fs::remove_file(self.entry_path(url))
            .with_context(|| format!("Failed to delete cache entry for {}", url))?;
        Ok(true)
    }

    /// Whether the install manifest has been populated into this generation.
    pub fn is_installed(&self) -> bool {
        self.generation_dir().join(INSTALL_MARKER).exists()
    }

    /// Write the whole install manifest in one step. The caller fetches
    /// every body first; nothing is written until all fetches succeeded,
    /// so a failed install leaves no partial shell behind.
    pub fn install(&self, entries: &[(String, Vec<u8>)]) -> Result<()> {
        for (url, body) in entries {
            self.put(url, body)?;
        }
        std::fs::write(self.generation_dir().join(INSTALL_MARKER), CACHE_GENERATION)?;
        info!(count = entries.len(), generation = %self.generation, "App shell installed");
        Ok(())
    }

    /// Delete every generation directory whose name differs from the
    /// active one. Must complete before any interception is served.
    pub fn activate(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if entry.file_name() != Path::new(&self.generation).as_os_str() {
                info!(stale = ?entry.file_name(), "Removing stale cache generation");
                std::fs::remove_dir_all(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Delete every generation, the active one included. Full-reset only.
    pub fn wipe_all(&self) -> Result<()> {
        std::fs::remove_dir_all(&self.root).context("Failed to wipe resource cache")?;
        Ok(())
    }
}

/// Derive a deterministic file name from a URL. The scheme is dropped
/// and non-alphanumeric characters collapse to underscores; the length
/// suffix keeps distinct URLs distinct after truncation.
fn entry_name(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let mut name: String = stripped
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    name.truncate(120);
    format!("{}-{}.json", name, stripped.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path, generation: &str) -> ResourceStore {
        ResourceStore::new(dir.to_path_buf(), generation).expect("store")
    }

    #[test]
    fn test_put_lookup_roundtrip() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path(), CACHE_GENERATION);

        let url = "http://127.0.0.1:8000/data/Anatomy.json";
        assert_eq!(store.lookup(url), None);

        store.put(url, b"[{\"id\":\"x\"}]").expect("put");
        assert_eq!(store.lookup(url), Some(b"[{\"id\":\"x\"}]".to_vec()));

        // Repeated lookups return the same bytes until the entry changes
        assert_eq!(store.lookup(url), Some(b"[{\"id\":\"x\"}]".to_vec()));
    }

    #[test]
    fn test_remove_reports_presence() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path(), CACHE_GENERATION);

        let url = "http://127.0.0.1:8000/data/Surgery.json";
        assert!(!store.remove(url).expect("remove"));
        store.put(url, b"{}").expect("put");
        assert!(store.remove(url).expect("remove"));
        assert_eq!(store.lookup(url), None);
    }

    #[test]
    fn test_activate_purges_stale_generations() {
        let tmp = tempfile::tempdir().expect("tempdir");
        // Seed two stale generations with content
        for old in ["qbank-core-v1", "qbank-core-v2"] {
            let stale = store_in(tmp.path(), old);
            stale.put("http://127.0.0.1:8000/data/old.json", b"{}").expect("put");
        }

        let store = store_in(tmp.path(), "qbank-core-v3");
        let removed = store.activate().expect("activate");
        assert_eq!(removed, 2);

        let remaining: Vec<_> = std::fs::read_dir(tmp.path())
            .expect("read_dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(remaining, vec![std::ffi::OsString::from("qbank-core-v3")]);
    }

    #[test]
    fn test_install_populates_and_marks() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path(), CACHE_GENERATION);
        assert!(!store.is_installed());

        let entries = vec![
            ("http://o/data/subjects.json".to_string(), b"[]".to_vec()),
            ("http://o/data/syllabus.json".to_string(), b"{}".to_vec()),
        ];
        store.install(&entries).expect("install");

        assert!(store.is_installed());
        assert_eq!(store.lookup("http://o/data/subjects.json"), Some(b"[]".to_vec()));
        assert_eq!(store.lookup("http://o/data/syllabus.json"), Some(b"{}".to_vec()));
    }

    #[test]
    fn test_colliding_entry_names_never_cross_serve() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path(), CACHE_GENERATION);

        // Same length, punctuation differs: both sanitize to the same
        // derived file name
        let a = "http://o/data/Forensic_Medicine.json";
        let b = "http://o/data/Forensic-Medicine.json";
        assert_eq!(entry_name(a), entry_name(b));

        store.put(a, b"BANK A").expect("put");
        assert_eq!(store.lookup(b), None);
        assert!(!store.contains(b));
        // Removing the other URL is a no-op and leaves the entry alone
        assert!(!store.remove(b).expect("remove"));
        assert_eq!(store.lookup(a), Some(b"BANK A".to_vec()));
    }

    #[test]
    fn test_entry_names_distinct() {
        let a = entry_name("http://o/data/Anatomy.json");
        let b = entry_name("http://o/data/Anatomy2.json");
        assert_ne!(a, b);
        // Deterministic
        assert_eq!(a, entry_name("http://o/data/Anatomy.json"));
    }
}
