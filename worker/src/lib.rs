//! Appshell Worker
//!
//! Offline-first cache worker for application shells. The worker runs
//! three lifecycle steps over a generation-keyed response store:
//! install pre-caches the configured asset manifest as one atomic
//! commit, activation prunes stale generations and claims clients,
//! and fetch serves cache-first with the network as fallback.

#![no_std]

extern crate alloc;

pub mod events;
pub mod fetch;
pub mod lifecycle;
pub mod manifest;
pub mod net;


pub use events::{Client, Clients, FetchEvent, FetchEventId, WorkerEvents};
pub use fetch::{is_cacheable, FetchDecision, FetchInterceptor, FetchSource};
pub use lifecycle::WorkerState;
pub use manifest::{AssetManifest, ConfigError, Scope, ShellConfig};
pub use net::{NetworkBackend, NetworkError};

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use appshell_http::{Request, Status};
use appshell_store::{CacheStore, RequestKey, StoreError};
use spin::RwLock;

/// Install failure.
#[derive(Debug, Clone)]
pub enum InstallError {
    /// An asset fetch failed on the network.
    AssetFetch { url: String, error: NetworkError },
    /// An asset came back with a non-success status.
    AssetStatus { url: String, status: Status },
    /// The store rejected the staged generation.
    Store(StoreError),
    /// Install was started from the wrong state.
    State { from: WorkerState },
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::AssetFetch { url, error } => {
                write!(f, "asset fetch failed for {}: {}", url, error)
            }
            InstallError::AssetStatus { url, status } => {
                write!(f, "asset {} returned status {}", url, status)
            }
            InstallError::Store(err) => write!(f, "store commit failed: {}", err),
            InstallError::State { from } => {
                write!(f, "install not allowed from state {}", from)
            }
        }
    }
}

/// Activation failure.
#[derive(Debug, Clone)]
pub enum ActivateError {
    /// Activation was started from the wrong state.
    State { from: WorkerState },
}

impl fmt::Display for ActivateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivateError::State { from } => {
                write!(f, "activate not allowed from state {}", from)
            }
        }
    }
}

/// Fetch failure.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// The network fetch failed and no usable fallback was cached.
    Network(NetworkError),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(err) => write!(f, "network fetch failed: {}", err),
        }
    }
}

/// Umbrella error for worker operations.
#[derive(Debug, Clone)]
pub enum WorkerError {
    /// Configuration rejected.
    Config(ConfigError),
    /// Install failed.
    Install(InstallError),
    /// Activation failed.
    Activate(ActivateError),
    /// Fetch failed.
    Fetch(FetchError),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::Config(err) => write!(f, "{}", err),
            WorkerError::Install(err) => write!(f, "{}", err),
            WorkerError::Activate(err) => write!(f, "{}", err),
            WorkerError::Fetch(err) => write!(f, "{}", err),
        }
    }
}

impl From<ConfigError> for WorkerError {
    fn from(err: ConfigError) -> Self {
        WorkerError::Config(err)
    }
}

impl From<InstallError> for WorkerError {
    fn from(err: InstallError) -> Self {
        WorkerError::Install(err)
    }
}

impl From<ActivateError> for WorkerError {
    fn from(err: ActivateError) -> Self {
        WorkerError::Activate(err)
    }
}

impl From<FetchError> for WorkerError {
    fn from(err: FetchError) -> Self {
        WorkerError::Fetch(err)
    }
}

/// Snapshot of a worker for diagnostics.
#[derive(Debug, Clone)]
pub struct WorkerStatus {
    /// Lifecycle state.
    pub state: WorkerState,
    /// Generation the worker serves from.
    pub generation: String,
    /// Entries cached in that generation.
    pub cached_assets: usize,
    /// Registered clients.
    pub clients: usize,
}

/// Offline cache worker for one application shell.
///
/// One worker instance serves one generation. Shipping a new shell
/// revision means constructing a new worker with a new generation
/// name over the same store: its install pre-caches alongside the old
/// generation, and its activation prunes everything else.
pub struct CacheWorker {
    /// Parsed configuration.
    config: ShellConfig,
    /// Scope derived from the configuration.
    scope: Scope,
    /// Lifecycle state.
    state: RwLock<WorkerState>,
    /// Response store, shared with the interceptor.
    store: Arc<dyn CacheStore>,
    /// Host network backend, shared with the interceptor.
    network: Arc<dyn NetworkBackend>,
    /// Cache-first fetch strategy.
    interceptor: FetchInterceptor,
    /// Clients under this worker's control.
    clients: RwLock<Clients>,
}

impl CacheWorker {
    /// Create a worker from a validated configuration.
    pub fn new(
        config: ShellConfig,
        store: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkBackend>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let scope = Scope::new(config.scope.as_str());
        let fallback = config
            .offline_fallback
            .as_deref()
            .map(|entry| scope.resolve(entry));
        let interceptor = FetchInterceptor::new(
            Arc::clone(&store),
            Arc::clone(&network),
            config.generation.as_str(),
            fallback,
        );

        Ok(Self {
            config,
            scope,
            state: RwLock::new(WorkerState::New),
            store,
            network,
            interceptor,
            clients: RwLock::new(Clients::new()),
        })
    }

    /// Create a worker from a JSON configuration.
    pub fn from_json(
        json: &str,
        store: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkBackend>,
    ) -> Result<Self, WorkerError> {
        let config = ShellConfig::from_json(json)?;
        Ok(Self::new(config, store, network)?)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    /// Generation this worker installs and serves from.
    pub fn generation(&self) -> &str {
        &self.config.generation
    }

    /// Scope the worker controls.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Snapshot state, generation, and cache usage for diagnostics.
    pub fn status(&self) -> WorkerStatus {
        let cached_assets = self
            .store
            .request_keys(&self.config.generation)
            .map(|keys| keys.len())
            .unwrap_or(0);
        WorkerStatus {
            state: self.state(),
            generation: self.config.generation.clone(),
            cached_assets,
            clients: self.clients.read().len(),
        }
    }

    /// Number of registered clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Controller generation of a client, if claimed.
    pub fn controller_of(&self, client_id: &str) -> Option<String> {
        self.clients
            .read()
            .controller_of(client_id)
            .map(String::from)
    }

    /// Register a client page with this worker.
    ///
    /// Returns `false` when the URL is outside the worker's scope. A
    /// worker that is already active controls new clients right away.
    pub fn register_client(&self, client: Client) -> bool {
        if !self.scope.contains(&client.url) {
            log::debug!(
                "[Shell Worker] client {} outside scope {}",
                client.url,
                self.scope.path()
            );
            return false;
        }
        let mut client = client;
        if self.state().is_active() {
            client.controller = Some(self.config.generation.clone());
        }
        self.clients.write().register(client);
        true
    }

    /// Remove a client. Returns `true` if it existed.
    pub fn unregister_client(&self, client_id: &str) -> bool {
        self.clients.write().remove(client_id)
    }

    /// Install: fetch every manifest asset and commit them as one
    /// generation.
    ///
    /// Any asset failing to fetch, or coming back non-2xx, fails the
    /// whole install. The partially staged generation is removed and
    /// the worker ends up `Failed` with nothing committed.
    pub fn on_install(&self) -> Result<(), InstallError> {
        if let Err(from) = self.enter(WorkerState::New, WorkerState::Installing) {
            log::warn!("[Shell Worker] install rejected in state {}", from);
            return Err(InstallError::State { from });
        }

        let generation = self.config.generation.clone();
        log::info!("[Shell Worker] installing generation {}", generation);

        if let Err(err) = self.store.open(&generation) {
            self.abort_install(&generation);
            return Err(InstallError::Store(err));
        }

        // Stage every asset; nothing is committed until all are in.
        let urls = self.config.assets.resolved(&self.scope);
        let mut staged = Vec::with_capacity(urls.len());
        for url in urls {
            let request = Request::get(url.as_str());
            let response = match self.network.fetch(&request) {
                Ok(response) => response,
                Err(error) => {
                    self.abort_install(&generation);
                    return Err(InstallError::AssetFetch { url, error });
                }
            };
            if !response.status.is_success() {
                self.abort_install(&generation);
                return Err(InstallError::AssetStatus {
                    url,
                    status: response.status,
                });
            }
            staged.push((RequestKey::for_request(&request), response));
        }

        let count = staged.len();
        if let Err(err) = self.store.put_all(&generation, staged) {
            self.abort_install(&generation);
            return Err(InstallError::Store(err));
        }

        self.transition(WorkerState::Installed);
        log::info!(
            "[Shell Worker] installed {} assets into {}",
            count,
            generation
        );
        Ok(())
    }

    /// Activate: prune every other generation, claim all registered
    /// clients, and start intercepting fetches.
    ///
    /// Pruning is best effort. A generation that cannot be deleted is
    /// logged and skipped, and activation still completes.
    pub fn on_activate(&self) -> Result<(), ActivateError> {
        if let Err(from) = self.enter(WorkerState::Installed, WorkerState::Activating) {
            log::warn!("[Shell Worker] activate rejected in state {}", from);
            return Err(ActivateError::State { from });
        }

        let current = self.config.generation.as_str();
        for name in self.store.generation_names() {
            if name == current {
                continue;
            }
            match self.store.delete_generation(&name) {
                Ok(true) => log::info!("[Shell Worker] pruned stale generation {}", name),
                Ok(false) => {}
                Err(err) => log::warn!("[Shell Worker] could not prune {}: {}", name, err),
            }
        }

        let claimed = self.clients.write().claim(current);
        if claimed > 0 {
            log::debug!("[Shell Worker] claimed {} clients", claimed);
        }

        self.transition(WorkerState::Active);
        log::info!("[Shell Worker] generation {} active", current);
        Ok(())
    }

    /// Fetch: intercept a request with the cache-first strategy.
    ///
    /// Anything but an active worker leaves the event untouched.
    pub fn on_fetch(&self, event: &mut FetchEvent) -> Result<FetchDecision, FetchError> {
        if !self.state().can_intercept_fetch() {
            return Ok(FetchDecision::Passthrough);
        }
        self.interceptor.intercept(event)
    }

    /// Atomically leave `expected` for `to`, reporting the actual
    /// state on mismatch.
    fn enter(&self, expected: WorkerState, to: WorkerState) -> Result<(), WorkerState> {
        let mut state = self.state.write();
        if *state != expected {
            return Err(*state);
        }
        log::debug!("[Shell Worker] state {} -> {}", *state, to);
        *state = to;
        Ok(())
    }

    /// Apply a transition, ignoring it when invalid.
    fn transition(&self, to: WorkerState) {
        let mut state = self.state.write();
        if !lifecycle::is_valid_transition(*state, to) {
            log::warn!(
                "[Shell Worker] ignoring invalid transition {} -> {}",
                *state,
                to
            );
            return;
        }
        log::debug!("[Shell Worker] state {} -> {}", *state, to);
        *state = to;
    }

    /// Drop whatever was staged for a failed install and mark the
    /// worker failed.
    fn abort_install(&self, generation: &str) {
        log::error!(
            "[Shell Worker] install failed, discarding generation {}",
            generation
        );
        if let Err(err) = self.store.delete_generation(generation) {
            log::warn!(
                "[Shell Worker] could not remove partial generation {}: {}",
                generation,
                err
            );
        }
        self.transition(WorkerState::Failed);
    }
}

impl WorkerEvents for CacheWorker {
    fn on_install(&self) -> Result<(), InstallError> {
        CacheWorker::on_install(self)
    }

    fn on_activate(&self) -> Result<(), ActivateError> {
        CacheWorker::on_activate(self)
    }

    fn on_fetch(&self, event: &mut FetchEvent) -> Result<FetchDecision, FetchError> {
        CacheWorker::on_fetch(self, event)
    }
}
