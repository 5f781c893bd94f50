//! Worker Events
//!
//! Fetch event plumbing, the lifecycle hook trait, and the registry of
//! clients a worker controls.

use alloc::string::{String, ToString};
use core::sync::atomic::{AtomicU64, Ordering};

use appshell_http::{Request, Response};
use hashbrown::HashMap;

use crate::fetch::FetchDecision;
use crate::{ActivateError, FetchError, InstallError};

/// Fetch event ID counter
static NEXT_FETCH_ID: AtomicU64 = AtomicU64::new(1);

/// Fetch event ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchEventId(u64);

impl FetchEventId {
    /// Allocate the next ID
    pub fn new() -> Self {
        Self(NEXT_FETCH_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for FetchEventId {
    fn default() -> Self {
        Self::new()
    }
}

/// One intercepted request and, once handled, its response.
#[derive(Debug)]
pub struct FetchEvent {
    /// Event ID
    id: FetchEventId,
    /// Request being intercepted
    request: Request,
    /// Whether a response was set
    responded: bool,
    /// Response set by the handler
    response: Option<Response>,
}

impl FetchEvent {
    /// Create an event for a request
    pub fn new(request: Request) -> Self {
        Self {
            id: FetchEventId::new(),
            request,
            responded: false,
            response: None,
        }
    }

    /// Get the event ID
    pub fn id(&self) -> FetchEventId {
        self.id
    }

    /// Get the request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Check if a response was set
    pub fn responded(&self) -> bool {
        self.responded
    }

    /// Set the response. Only the first call takes effect.
    pub fn respond_with(&mut self, response: Response) {
        if !self.responded {
            self.responded = true;
            self.response = Some(response);
        }
    }

    /// Take the response out of the event
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }
}

/// Lifecycle hooks of a cache worker.
///
/// Each hook runs to completion before returning. There is no waiting
/// phase between install and activation: once `on_install` returns
/// `Ok`, activation may run immediately.
pub trait WorkerEvents: Send + Sync {
    /// Install: pre-cache the asset manifest.
    fn on_install(&self) -> Result<(), InstallError>;

    /// Activate: prune stale generations and claim clients.
    fn on_activate(&self) -> Result<(), ActivateError>;

    /// Fetch: answer a request, or let it pass through.
    fn on_fetch(&self, event: &mut FetchEvent) -> Result<FetchDecision, FetchError>;
}

/// A page living under a worker's scope.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client ID
    pub id: String,
    /// Page URL
    pub url: String,
    /// Generation controlling this client, if claimed
    pub controller: Option<String>,
}

impl Client {
    /// Create an uncontrolled client
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            controller: None,
        }
    }
}

/// Registry of clients known to a worker.
pub struct Clients {
    clients: HashMap<String, Client>,
}

impl Clients {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Add a client, replacing any previous entry with the same ID
    pub fn register(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    /// Get a client by ID
    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Remove a client. Returns `true` if it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.clients.remove(id).is_some()
    }

    /// Number of registered clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Check if no clients are registered
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Put every client under the given controller.
    ///
    /// Returns the number of clients whose controller changed.
    pub fn claim(&mut self, controller: &str) -> usize {
        let mut claimed = 0;
        for client in self.clients.values_mut() {
            if client.controller.as_deref() != Some(controller) {
                client.controller = Some(controller.to_string());
                claimed += 1;
            }
        }
        claimed
    }

    /// Controller of the given client, if claimed
    pub fn controller_of(&self, id: &str) -> Option<&str> {
        self.clients.get(id).and_then(|c| c.controller.as_deref())
    }
}

impl Default for Clients {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appshell_http::Status;

    #[test]
    fn test_fetch_event_ids_unique() {
        let a = FetchEvent::new(Request::get("/a"));
        let b = FetchEvent::new(Request::get("/b"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_respond_with_sets_response() {
        let mut event = FetchEvent::new(Request::get("/index.html"));
        assert!(!event.responded());

        event.respond_with(Response::new(Status::OK).with_body("hello"));
        assert!(event.responded());

        let response = event.take_response().unwrap();
        assert_eq!(response.status, Status::OK);
        assert!(event.take_response().is_none());
    }

    #[test]
    fn test_respond_with_first_wins() {
        let mut event = FetchEvent::new(Request::get("/index.html"));
        event.respond_with(Response::new(Status::OK).with_body("first"));
        event.respond_with(Response::new(Status::NOT_FOUND).with_body("second"));

        let response = event.take_response().unwrap();
        assert_eq!(response.status, Status::OK);
        assert_eq!(response.text().as_deref(), Some("first"));
    }

    #[test]
    fn test_clients_register_get_remove() {
        let mut clients = Clients::new();
        assert!(clients.is_empty());

        clients.register(Client::new("c1", "/index.html"));
        assert_eq!(clients.len(), 1);
        assert_eq!(clients.get("c1").unwrap().url, "/index.html");
        assert!(clients.get("c1").unwrap().controller.is_none());

        assert!(clients.remove("c1"));
        assert!(!clients.remove("c1"));
        assert!(clients.is_empty());
    }

    #[test]
    fn test_claim_counts_changed_clients() {
        let mut clients = Clients::new();
        clients.register(Client::new("c1", "/"));
        clients.register(Client::new("c2", "/about"));

        assert_eq!(clients.claim("shell-v1"), 2);
        assert_eq!(clients.controller_of("c1"), Some("shell-v1"));

        // Claiming again under the same generation is a no-op.
        assert_eq!(clients.claim("shell-v1"), 0);

        assert_eq!(clients.claim("shell-v2"), 2);
        assert_eq!(clients.controller_of("c2"), Some("shell-v2"));
    }
}
