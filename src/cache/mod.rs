//! Persistent resource cache for offline use.
//!
//! This module provides the `ResourceStore`: a single versioned
//! generation of URL-to-response entries on disk. The install manifest
//! populates it at startup, activation purges stale generations, and
//! the fetch service reads and writes it while serving requests.

pub mod store;

pub use store::{ResourceStore, StoredResponse, CACHE_GENERATION};
