//! Application state management.
//!
//! The `App` struct owns every component: config, the resource store,
//! the fetch service handle, the data layer, persistence, and the
//! current view. There is no ambient global state; full reset tears the
//! owned state down and the next launch rebuilds it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::cache::{ResourceStore, CACHE_GENERATION};
use crate::config::{Config, Theme};
use crate::data::DataStore;
use crate::db::{Db, DbResultSink};
use crate::fetch::{install_manifest, FetchHandle, FetchService};
use crate::models::{GlobalStats, SessionSummary, Subject};
use crate::router::{ChapterSelector, Route};
use crate::session::QuizSession;
use crate::utils::contains_ignore_case;

/// Same-origin shell documents installed into a fresh cache generation.
/// Every entry must be reachable at install time; the install is
/// all-or-nothing.
const SHELL_MANIFEST: &[&str] = &["data/subjects.json", "data/syllabus.json"];

/// Minimum search query length before the home grid filters.
const MIN_SEARCH_LENGTH: usize = 2;

/// What the main area is showing.
#[derive(Debug)]
pub enum View {
    Home,
    Chapters { subject: String },
    Quiz,
    Summary(SessionSummary),
    Fatal(String),
}

/// One selectable row of the chapter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRow {
    pub number: u32,
    pub title: String,
    pub count: usize,
}

pub struct App {
    pub config: Config,
    pub db: Db,
    pub store: Arc<ResourceStore>,
    pub fetch: FetchHandle,
    pub data: DataStore,
    pub global_stats: GlobalStats,
    origin: String,

    pub view: View,
    pub session: Option<QuizSession>,
    pub last_quiz: Option<(String, ChapterSelector)>,
    pub show_header: bool,
    pub status_message: Option<String>,

    pub searching: bool,
    pub search_query: String,
    pub home_selection: usize,
    pub chapter_selection: usize,
    pub confirming_reset: bool,
    pub should_quit: bool,

    nav_generation: u64,
}

impl App {
    /// Create the application: open the cache, install the shell when
    /// this generation is fresh, purge stale generations, then start
    /// the fetch service. Activation completes before any interception
    /// is served.
    pub async fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let origin = std::env::var("QUIZCACHE_ORIGIN")
            .ok()
            .unwrap_or_else(|| config.content_origin.clone());
        debug!(%origin, "Content origin configured");

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| PathBuf::from("./cache"));
        let store = Arc::new(ResourceStore::new(cache_dir, CACHE_GENERATION)?);

        if !store.is_installed() {
            let manifest: Vec<String> = SHELL_MANIFEST
                .iter()
                .map(|path| format!("{}/{}", origin, path))
                .collect();
            if let Err(e) = install_manifest(&store, &manifest).await {
                warn!(error = %e, "App shell install failed, continuing uncached");
            }
        }
        match store.activate() {
            Ok(removed) if removed > 0 => info!(removed, "Stale cache generations purged"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Cache activation cleanup failed"),
        }

        let fetch = FetchService::spawn(Arc::clone(&store), origin.clone())?;
        let data = DataStore::new(fetch.clone(), origin.clone());
        let db = Db::new(config.data_dir().unwrap_or_else(|_| PathBuf::from("./data")))?;
        let global_stats = db.load_stats();

        Ok(Self {
            config,
            db,
            store,
            fetch,
            data,
            global_stats,
            origin,

            view: View::Home,
            session: None,
            last_quiz: None,
            show_header: true,
            status_message: None,

            searching: false,
            search_query: String::new(),
            home_selection: 0,
            chapter_selection: 0,
            confirming_reset: false,
            should_quit: false,

            nav_generation: 0,
        })
    }

    /// Load the subject registry and syllabus. Failure of either is
    /// fatal: a blocking error view replaces the whole application.
    pub async fn init_library(&mut self) {
        match self.data.init().await {
            Ok(()) => self.view = View::Home,
            Err(e) => {
                error!(error = %e, "Startup load failed");
                self.view = View::Fatal(format!("Could not load Library. {}", e));
            }
        }
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    pub fn toggle_theme(&mut self) {
        self.config.theme = self.config.theme.toggle();
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to persist theme preference");
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Dispatch a navigation fragment. Unrecognized fragments are
    /// ignored. Results of loads triggered by an older navigation are
    /// dropped when a newer one has superseded it.
    pub async fn navigate(&mut self, fragment: &str) {
        let Some(route) = Route::parse(fragment) else {
            debug!(fragment, "Ignoring unrecognized fragment");
            return;
        };
        self.nav_generation += 1;
        let generation = self.nav_generation;
        self.status_message = None;
        self.show_header = !matches!(route, Route::Quiz(..));

        match route {
            Route::Home => {
                self.session = None;
                self.search_query.clear();
                self.searching = false;
                self.home_selection = 0;
                self.view = View::Home;
            }
            Route::Subject(name) => {
                self.session = None;
                if let Err(e) = self.data.load_subject(&name).await {
                    warn!(subject = %name, error = %e, "Bank load failed");
                    self.status_message = Some(e.to_string());
                }
                if generation != self.nav_generation {
                    debug!(subject = %name, "Dropping stale navigation result");
                    return;
                }
                self.chapter_selection = 0;
                self.view = View::Chapters { subject: name };
            }
            Route::Quiz(name, selector) => {
                if !self.data.is_resident(&name) {
                    if let Err(e) = self.data.load_subject(&name).await {
                        warn!(subject = %name, error = %e, "Bank load failed");
                        self.status_message = Some(e.to_string());
                        self.show_header = true;
                        return;
                    }
                }
                if generation != self.nav_generation {
                    debug!(subject = %name, "Dropping stale navigation result");
                    return;
                }
                let Some(bank) = self.data.bank(&name) else {
                    self.show_header = true;
                    return;
                };
                let sink = Box::new(DbResultSink::new(self.db.clone()));
                self.session = Some(QuizSession::start(&name, selector, bank, sink));
                self.last_quiz = Some((name, selector));
                self.view = View::Quiz;
            }
        }
    }

    // =========================================================================
    // Home and chapter views
    // =========================================================================

    /// Subjects visible on the home grid, filtered by the search query
    /// once it reaches the minimum length.
    pub fn visible_subjects(&self) -> Vec<&Subject> {
        if self.search_query.chars().count() < MIN_SEARCH_LENGTH {
            return self.data.subjects.iter().collect();
        }
        self.data
            .subjects
            .iter()
            .filter(|s| contains_ignore_case(&s.name, &self.search_query))
            .collect()
    }

    /// Chapter rows for a subject, numbered positionally. Chapters with
    /// no questions in the bank are hidden.
    pub fn chapter_rows(&self, subject: &str) -> Vec<ChapterRow> {
        let bank = self.data.bank(subject).unwrap_or(&[]);
        self.data
            .chapters_for(subject)
            .iter()
            .enumerate()
            .filter_map(|(idx, title)| {
                let number = idx as u32 + 1;
                let count = bank.iter().filter(|q| q.chapter == Some(number)).count();
                (count > 0).then(|| ChapterRow {
                    number,
                    title: title.clone(),
                    count,
                })
            })
            .collect()
    }

    pub fn bank_size(&self, subject: &str) -> usize {
        self.data.bank(subject).map(<[_]>::len).unwrap_or(0)
    }

    // =========================================================================
    // Quiz session
    // =========================================================================

    /// Submit an answer for the current question. Already-answered
    /// questions ignore further submissions.
    pub fn answer_current(&mut self, selected: usize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(bank) = self.data.bank(&session.subject) else {
            return;
        };
        session.answer(selected, bank);
    }

    pub fn nav_question(&mut self, delta: i64) {
        if let Some(session) = self.session.as_mut() {
            session.nav(delta);
        }
    }

    /// Advance to the next question, or finish when on the last one.
    pub fn advance(&mut self) {
        let at_last = self.session.as_ref().map(QuizSession::is_last).unwrap_or(false);
        if at_last {
            self.finish_quiz();
        } else {
            self.nav_question(1);
        }
    }

    /// End the session: merge its counters into the global stats, then
    /// show the summary. Header chrome comes back.
    pub fn finish_quiz(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let summary = session.finish();
        match self.db.merge_session(&session.stats()) {
            Ok(stats) => self.global_stats = stats,
            Err(e) => warn!(error = %e, "Failed to persist global stats"),
        }
        self.show_header = true;
        self.view = View::Summary(summary);
    }

    // =========================================================================
    // Offline management
    // =========================================================================

    /// URL of a subject's backing bank file.
    pub fn bank_url(&self, subject: &str) -> String {
        let file = self
            .data
            .subjects
            .iter()
            .find(|s| s.name == subject)
            .map(|s| s.file.clone())
            .unwrap_or_else(|| format!("{}.json", subject));
        format!("{}/data/{}", self.origin, file)
    }

    /// Deliberately fetch one URL and pin its response into the store.
    pub async fn save_resource(&mut self, url: &str) -> bool {
        match self.fetch.get(url).await {
            Ok(body) => match self.store.put(url, &body) {
                Ok(()) => {
                    self.status_message = Some("Downloaded for offline".to_string());
                    true
                }
                Err(e) => {
                    warn!(url, error = %e, "Offline save failed");
                    self.status_message = Some("Download failed".to_string());
                    false
                }
            },
            Err(e) => {
                warn!(url, error = %e, "Offline save failed");
                self.status_message = Some("Download failed".to_string());
                false
            }
        }
    }

    /// Remove one URL from the store. Returns whether an entry existed.
    pub fn delete_resource(&mut self, url: &str) -> bool {
        match self.store.remove(url) {
            Ok(true) => {
                self.status_message = Some("Removed from device".to_string());
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(url, error = %e, "Offline removal failed");
                false
            }
        }
    }

    // =========================================================================
    // Full reset
    // =========================================================================

    /// Destructive factory reset: all persisted state and every cache
    /// generation are gone. The fetch service and data layer are rebuilt
    /// against a fresh store and the library reloads immediately, so no
    /// restart is needed.
    pub async fn full_reset(&mut self) {
        info!("Full reset");
        if let Err(e) = self.db.clear() {
            warn!(error = %e, "Failed to clear result log");
        }
        self.fetch.shutdown().await;
        if let Err(e) = self.store.wipe_all() {
            warn!(error = %e, "Failed to wipe resource cache");
        }
        let root = self.store.root().to_path_buf();
        match ResourceStore::new(root, CACHE_GENERATION) {
            Ok(store) => self.store = Arc::new(store),
            Err(e) => warn!(error = %e, "Failed to recreate resource cache"),
        }
        match FetchService::spawn(Arc::clone(&self.store), self.origin.clone()) {
            Ok(handle) => self.fetch = handle,
            Err(e) => warn!(error = %e, "Failed to restart fetch service"),
        }
        self.config = Config::default();
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to reset config");
        }

        self.data = DataStore::new(self.fetch.clone(), self.origin.clone());
        self.global_stats = GlobalStats::default();
        self.session = None;
        self.last_quiz = None;
        self.show_header = true;
        self.confirming_reset = false;
        self.home_selection = 0;
        self.search_query.clear();
        self.status_message = Some("Reset complete".to_string());
        self.init_library().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::service::test_handle;

    fn bank_json() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!([
            { "id": "Anatomy_Ch1_001", "question_text": "q1",
              "options": ["a", "b"], "correct_option": "A" },
            { "id": "Anatomy_Ch2_002", "question_text": "q2",
              "options": ["a", "b"], "correct_option": "B" }
        ]))
        .expect("json")
    }

    /// App wired to a closure-backed fetch handle and temp directories.
    /// The origin points at a closed port, so anything reaching a real
    /// network path fails fast.
    fn test_app(dirs: &tempfile::TempDir) -> App {
        let origin = "http://127.0.0.1:1".to_string();
        let handle = test_handle(|url| {
            if url.ends_with("subjects.json") {
                Ok(br#"[{"name":"Anatomy","file":"01_Anatomy.json"}]"#.to_vec())
            } else if url.ends_with("syllabus.json") {
                Ok(br#"{"Anatomy":["Bones","Joints"]}"#.to_vec())
            } else if url.contains("Anatomy") {
                Ok(bank_json())
            } else {
                Err(crate::fetch::FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }
        });
        let store = Arc::new(
            ResourceStore::new(dirs.path().join("cache"), CACHE_GENERATION).expect("store"),
        );
        App {
            config: Config::default(),
            db: Db::new(dirs.path().join("data")).expect("db"),
            store,
            fetch: handle.clone(),
            data: DataStore::new(handle, origin.clone()),
            global_stats: GlobalStats::default(),
            origin,
            view: View::Home,
            session: None,
            last_quiz: None,
            show_header: true,
            status_message: None,
            searching: false,
            search_query: String::new(),
            home_selection: 0,
            chapter_selection: 0,
            confirming_reset: false,
            should_quit: false,
            nav_generation: 0,
        }
    }

    #[tokio::test]
    async fn test_quiz_navigation_hides_header() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;

        app.navigate("quiz/Anatomy/ALL").await;
        assert!(!app.show_header);
        assert!(matches!(app.view, View::Quiz));
        let session = app.session.as_ref().expect("session");
        assert_eq!(session.len(), 2);
        assert_eq!(session.selector, ChapterSelector::All);

        app.navigate("/").await;
        assert!(app.show_header);
        assert!(app.session.is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_fragment_is_ignored() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;

        app.navigate("subject/Anatomy").await;
        assert!(matches!(app.view, View::Chapters { .. }));

        app.navigate("bogus/route/here").await;
        assert!(matches!(app.view, View::Chapters { .. }));
    }

    #[tokio::test]
    async fn test_failed_bank_load_blocks_quiz_entry() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;

        app.navigate("quiz/Missing/ALL").await;
        assert!(app.session.is_none());
        assert!(app.show_header);
        let message = app.status_message.as_deref().expect("notice");
        assert!(message.contains("Missing.json"));
    }

    #[tokio::test]
    async fn test_finish_merges_global_stats() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;

        app.navigate("quiz/Anatomy/ALL").await;
        app.answer_current(0); // correct
        app.advance();
        app.answer_current(0); // wrong
        app.advance(); // at last question: finishes

        match &app.view {
            View::Summary(summary) => {
                assert_eq!(summary.correct, 1);
                assert_eq!(summary.wrong, 1);
                assert_eq!(summary.accuracy, 50);
            }
            other => panic!("expected summary, got {:?}", other),
        }
        let stats = app.db.load_stats();
        assert_eq!(stats.total_answered, 2);
        assert_eq!(stats.total_correct, 1);
        assert_eq!(stats.quizzes_taken, 1);
    }

    #[tokio::test]
    async fn test_chapter_rows_hide_empty_chapters() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;
        app.navigate("subject/Anatomy").await;

        // Bank covers chapters 1 and 2; the syllabus lists two chapters,
        // both populated here
        let rows = app.chapter_rows("Anatomy");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ChapterRow { number: 1, title: "Bones".into(), count: 1 });
    }

    #[tokio::test]
    async fn test_search_filters_home_grid() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;

        app.search_query = "a".to_string(); // below minimum length
        assert_eq!(app.visible_subjects().len(), 1);
        app.search_query = "anat".to_string();
        assert_eq!(app.visible_subjects().len(), 1);
        app.search_query = "surg".to_string();
        assert!(app.visible_subjects().is_empty());
    }

    #[tokio::test]
    async fn test_full_reset_clears_state() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;

        app.navigate("quiz/Anatomy/ALL").await;
        app.answer_current(0);
        app.finish_quiz();
        app.store.put("http://127.0.0.1:1/data/x.json", b"{}").expect("put");

        app.full_reset().await;
        assert!(app.session.is_none());
        assert!(app.db.load_results().is_empty());
        assert_eq!(app.db.load_stats().quizzes_taken, 0);
        assert!(!app.store.contains("http://127.0.0.1:1/data/x.json"));
        assert!(app.data.subjects.is_empty());
    }

    #[tokio::test]
    async fn test_full_reset_leaves_a_live_fetch_service() {
        let dirs = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dirs);
        app.init_library().await;

        app.full_reset().await;

        // The replacement service is running: a request may fail on the
        // network, but not because the service is gone.
        let err = app
            .fetch
            .get("http://127.0.0.1:1/data/Anatomy.json")
            .await
            .expect_err("no listener");
        assert!(!matches!(err, crate::fetch::FetchError::ServiceClosed));
    }
}
