//! Fetch interception layer.
//!
//! Every outbound request the application issues goes through the
//! `FetchService` actor, which applies the offline-first policy against
//! the persistent `ResourceStore`. Callers only see bytes or a
//! `FetchError`; whether they came from cache or network is invisible.

pub mod error;
pub mod service;

pub use error::FetchError;
pub use service::{install_manifest, FetchHandle, FetchService};
