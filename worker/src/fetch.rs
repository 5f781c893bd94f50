//! Fetch Interception
//!
//! Cache-first handling of fetch events: serve from the current
//! generation when the response is cached, fall back to the network
//! otherwise, write cacheable responses back, and serve the offline
//! fallback page when the network is down.

use alloc::string::String;
use alloc::sync::Arc;

use appshell_http::{Method, Response, ResponseKind};
use appshell_store::{CacheStore, RequestKey};

use crate::events::FetchEvent;
use crate::net::NetworkBackend;
use crate::FetchError;

// ── Decisions ───────────────────────────────────────────────

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// The current cache generation.
    Cache,
    /// The network.
    Network,
    /// The configured offline fallback page.
    Fallback,
}

/// Outcome of intercepting a fetch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// A response was set on the event.
    Served(FetchSource),
    /// The event was left for the host to handle.
    Passthrough,
}

/// Check if a response may be written to the cache.
///
/// Only successful same-origin responses qualify. Opaque and CORS
/// responses are never cached.
pub fn is_cacheable(response: &Response) -> bool {
    response.status.is_success() && response.kind == ResponseKind::Basic
}

// ── Interceptor ─────────────────────────────────────────────

/// Cache-first fetch strategy bound to one generation.
pub struct FetchInterceptor {
    store: Arc<dyn CacheStore>,
    network: Arc<dyn NetworkBackend>,
    generation: String,
    /// Resolved fallback URL, if configured.
    fallback: Option<String>,
}

impl FetchInterceptor {
    /// Create an interceptor over the given store and network.
    pub fn new(
        store: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkBackend>,
        generation: impl Into<String>,
        fallback: Option<String>,
    ) -> Self {
        Self {
            store,
            network,
            generation: generation.into(),
            fallback,
        }
    }

    /// Handle one fetch event with the cache-first strategy.
    ///
    /// Non-GET requests pass through untouched. A failing store read
    /// degrades the request to network-only, skipping write-back. A
    /// network failure serves the offline fallback when one is
    /// configured and cached, and is an error otherwise.
    pub fn intercept(&self, event: &mut FetchEvent) -> Result<FetchDecision, FetchError> {
        if event.request().method != Method::Get {
            return Ok(FetchDecision::Passthrough);
        }

        let key = RequestKey::for_request(event.request());

        let mut degraded = false;
        match self.store.lookup(&self.generation, &key) {
            Ok(Some(cached)) => {
                log::debug!("[Shell Fetch] cache hit: {}", key);
                event.respond_with(cached);
                return Ok(FetchDecision::Served(FetchSource::Cache));
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("[Shell Fetch] cache read failed for {}: {}", key, err);
                degraded = true;
            }
        }

        match self.network.fetch(event.request()) {
            Ok(response) => {
                // Write-back is best effort and never affects the response.
                if !degraded && is_cacheable(&response) {
                    if let Err(err) = self.store.put(&self.generation, key, response.clone()) {
                        log::warn!("[Shell Fetch] write-back failed: {}", err);
                    }
                }
                event.respond_with(response);
                Ok(FetchDecision::Served(FetchSource::Network))
            }
            Err(err) => {
                if let Some(fallback) = &self.fallback {
                    let fallback_key = RequestKey::new(Method::Get, fallback);
                    if let Ok(Some(cached)) = self.store.lookup(&self.generation, &fallback_key) {
                        log::debug!(
                            "[Shell Fetch] offline fallback for {}",
                            event.request().url
                        );
                        event.respond_with(cached);
                        return Ok(FetchDecision::Served(FetchSource::Fallback));
                    }
                }
                log::warn!(
                    "[Shell Fetch] network fetch failed for {}: {}",
                    event.request().url,
                    err
                );
                Err(FetchError::Network(err))
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────
