//! Offline-first fetch service.
//!
//! All application requests go through this actor rather than a bare
//! HTTP client. It runs detached from any particular view, owning its
//! own request loop; the persistent `ResourceStore` is the only state it
//! shares with the rest of the application.
//!
//! Policy, in order:
//! 1. Cross-origin URLs not matching the third-party allow-pattern pass
//!    straight to the network and are never cached.
//! 2. Cache hit: the stored bytes are returned with no network attempt.
//! 3. Cache miss: network fetch; a failure is returned as-is, with no
//!    substitute content.
//! 4. Successful same-origin responses are written back into the store
//!    opportunistically, off the reply path, so dynamically requested
//!    bank files become offline-available after their first load.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::try_join_all;
use reqwest::Client;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::cache::ResourceStore;

use super::FetchError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Buffer size for the request channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Hostname fragment identifying allow-listed third-party assets.
const THIRD_PARTY_ALLOW_PATTERN: &str = "cdn";

enum FetchRequest {
    Get {
        url: String,
        reply: oneshot::Sender<Result<Vec<u8>, FetchError>>,
    },
    Shutdown,
}

/// Cloneable handle to the fetch service. Dropping every handle stops
/// the service once in-flight requests drain.
#[derive(Clone)]
pub struct FetchHandle {
    tx: mpsc::Sender<FetchRequest>,
}

impl FetchHandle {
    pub(crate) fn new(tx: mpsc::Sender<FetchRequest>) -> Self {
        Self { tx }
    }

    /// Fetch a URL through the interception policy.
    pub async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(FetchRequest::Get {
                url: url.to_string(),
                reply,
            })
            .await
            .map_err(|_| FetchError::ServiceClosed)?;
        rx.await.map_err(|_| FetchError::ServiceClosed)?
    }

    /// Deregister the service. Requests sent afterwards fail with
    /// `ServiceClosed`.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(FetchRequest::Shutdown).await;
    }
}

pub struct FetchService {
    client: Client,
    store: Arc<ResourceStore>,
    origin: String,
}

impl FetchService {
    /// Spawn the service task and return a handle to it.
    pub fn spawn(store: Arc<ResourceStore>, origin: String) -> Result<FetchHandle> {
        let client = build_client()?;
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let service = Self {
            client,
            store,
            origin,
        };
        tokio::spawn(service.run(rx));
        Ok(FetchHandle::new(tx))
    }

    async fn run(self, mut rx: mpsc::Receiver<FetchRequest>) {
        while let Some(request) = rx.recv().await {
            match request {
                FetchRequest::Get { url, reply } => {
                    let result = self.handle(&url).await;
                    let _ = reply.send(result);
                }
                FetchRequest::Shutdown => {
                    debug!("Fetch service shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if !intercepts(url, &self.origin) {
            // Cross-origin call outside the allow-pattern, e.g. an
            // assistant API. Pass through untouched.
            return fetch_url(&self.client, url).await;
        }

        if let Some(body) = self.store.lookup(url) {
            debug!(url, "Serving from resource cache");
            return Ok(body);
        }

        let body = fetch_url(&self.client, url).await?;

        if should_cache(url, &self.origin) {
            let store = Arc::clone(&self.store);
            let url = url.to_string();
            let clone = body.clone();
            tokio::spawn(async move {
                if let Err(e) = store.put(&url, &clone) {
                    warn!(url, error = %e, "Failed to cache fetched resource");
                }
            });
        }

        Ok(body)
    }
}

/// Whether a URL falls under the interception policy at all: same-origin
/// requests and allow-listed third-party assets do, everything else
/// passes through.
pub fn intercepts(url: &str, origin: &str) -> bool {
    url.starts_with(origin) || url.contains(THIRD_PARTY_ALLOW_PATTERN)
}

/// Only plain same-origin responses are written back dynamically; the
/// allow-listed third-party assets enter the store at install time only.
pub fn should_cache(url: &str, origin: &str) -> bool {
    url.starts_with(origin)
}

fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

async fn fetch_url(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

/// Fetch every manifest URL, then write the whole shell in one step.
/// Any fetch failure fails the install and nothing is written, so the
/// manifest must only list URLs reachable at install time.
pub async fn install_manifest(store: &ResourceStore, urls: &[String]) -> Result<()> {
    let client = build_client()?;
    let bodies = try_join_all(urls.iter().map(|url| {
        let client = client.clone();
        async move { fetch_url(&client, url).await.map(|body| (url.clone(), body)) }
    }))
    .await?;
    store.install(&bodies)?;
    Ok(())
}

/// Build a handle answered by a closure instead of the real service.
/// Lets callers test their fetch behavior without network or disk.
#[cfg(test)]
pub(crate) fn test_handle<F>(responder: F) -> FetchHandle
where
    F: Fn(&str) -> Result<Vec<u8>, FetchError> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            match request {
                FetchRequest::Get { url, reply } => {
                    let _ = reply.send(responder(&url));
                }
                FetchRequest::Shutdown => break,
            }
        }
    });
    FetchHandle::new(tx)
}
