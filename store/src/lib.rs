//! Response Store
//!
//! Generation-keyed storage for cached HTTP responses. Each generation
//! is an independent namespace of request keys, so swapping a shell
//! version means installing a fresh generation and pruning the old ones.

#![no_std]

extern crate alloc;

mod memory;

pub use memory::MemoryStore;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use appshell_http::{Method, Request, Response};

// ── Request keys ────────────────────────────────────────────

/// Key under which a response is stored: `"METHOD:url"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    /// Build a key from a method and a URL.
    pub fn new(method: Method, url: &str) -> Self {
        Self(format!("{}:{}", method.as_str(), url))
    }

    /// Build the key for a request.
    pub fn for_request(request: &Request) -> Self {
        Self::new(request.method, &request.url)
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Errors ──────────────────────────────────────────────────

/// Store error types.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// The named generation does not exist.
    GenerationNotFound,
    /// The backend ran out of quota.
    QuotaExceeded,
    /// Backend storage failure.
    Storage(String),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::GenerationNotFound => write!(f, "generation not found"),
            StoreError::QuotaExceeded => write!(f, "storage quota exceeded"),
            StoreError::Storage(s) => write!(f, "storage error: {}", s),
        }
    }
}

// ── Generations ─────────────────────────────────────────────

/// A stored response plus its size accounting.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The cached response.
    pub response: Response,
    /// Body size in bytes.
    pub size: usize,
}

impl StoredEntry {
    /// Wrap a response, recording its body size.
    pub fn new(response: Response) -> Self {
        let size = response.body.len();
        Self { response, size }
    }
}

/// One cache generation: a named map of request keys to responses.
#[derive(Debug, Clone)]
pub struct Generation {
    name: String,
    entries: BTreeMap<RequestKey, StoredEntry>,
    total_size: usize,
}

impl Generation {
    /// Create an empty generation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
            total_size: 0,
        }
    }

    /// Generation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a response, replacing any previous entry for the key.
    pub fn put(&mut self, key: RequestKey, response: Response) {
        let entry = StoredEntry::new(response);
        let size = entry.size;

        if let Some(old) = self.entries.remove(&key) {
            self.total_size -= old.size;
        }

        self.entries.insert(key, entry);
        self.total_size += size;
    }

    /// Look up a response by key.
    pub fn lookup(&self, key: &RequestKey) -> Option<&Response> {
        self.entries.get(key).map(|e| &e.response)
    }

    /// Remove an entry. Returns `true` if it existed.
    pub fn remove(&mut self, key: &RequestKey) -> bool {
        if let Some(entry) = self.entries.remove(key) {
            self.total_size -= entry.size;
            true
        } else {
            false
        }
    }

    /// All request keys in this generation, in sorted order.
    pub fn keys(&self) -> Vec<RequestKey> {
        self.entries.keys().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the generation holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total body bytes stored.
    pub fn usage_bytes(&self) -> usize {
        self.total_size
    }
}

// ── Store trait ─────────────────────────────────────────────

/// Interface to generation-keyed response storage.
///
/// `put_all` commits a batch as a unit: on success every entry is
/// visible, on error none are. Read methods surface backend failures
/// through `StoreError` rather than panicking.
pub trait CacheStore: Send + Sync {
    /// Create the generation if it does not exist.
    fn open(&self, generation: &str) -> Result<(), StoreError>;

    /// Look up a response. `Ok(None)` when the key, or the whole
    /// generation, is absent.
    fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>, StoreError>;

    /// Store one response, creating the generation if needed.
    fn put(&self, generation: &str, key: RequestKey, response: Response) -> Result<(), StoreError>;

    /// Store a batch of responses as one atomic commit.
    fn put_all(
        &self,
        generation: &str,
        entries: Vec<(RequestKey, Response)>,
    ) -> Result<(), StoreError>;

    /// All request keys in a generation.
    fn request_keys(&self, generation: &str) -> Result<Vec<RequestKey>, StoreError>;

    /// Names of all generations, in sorted order.
    fn generation_names(&self) -> Vec<String>;

    /// Delete a generation. Returns `true` if it existed.
    fn delete_generation(&self, generation: &str) -> Result<bool, StoreError>;

    /// Check if a generation exists.
    fn contains(&self, generation: &str) -> bool;
}

// ── Tests ───────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use appshell_http::Status;

    fn response(body: &str) -> Response {
        Response::new(Status::OK).with_body(body)
    }

    #[test]
    fn key_format() {
        let key = RequestKey::new(Method::Get, "/index.html");
        assert_eq!(key.as_str(), "GET:/index.html");
    }

    #[test]
    fn key_for_request() {
        let req = Request::post("/api/send", b"x".to_vec());
        let key = RequestKey::for_request(&req);
        assert_eq!(key.as_str(), "POST:/api/send");
    }

    #[test]
    fn put_and_lookup() {
        let mut generation = Generation::new("shell-v1");
        let key = RequestKey::new(Method::Get, "/app.js");
        generation.put(key.clone(), response("let x = 1;"));

        let cached = generation.lookup(&key).unwrap();
        assert_eq!(cached.text(), Some("let x = 1;".to_string()));
        assert_eq!(generation.name(), "shell-v1");
        assert_eq!(generation.len(), 1);
    }

    #[test]
    fn put_replaces_previous_entry() {
        let mut generation = Generation::new("shell-v1");
        let key = RequestKey::new(Method::Get, "/app.js");
        generation.put(key.clone(), response("aaaa"));
        generation.put(key.clone(), response("bb"));

        assert_eq!(generation.len(), 1);
        assert_eq!(generation.usage_bytes(), 2);
        assert_eq!(generation.lookup(&key).unwrap().text(), Some("bb".to_string()));
    }

    #[test]
    fn remove_updates_accounting() {
        let mut generation = Generation::new("shell-v1");
        let key = RequestKey::new(Method::Get, "/icon.png");
        generation.put(key.clone(), response("png"));

        assert!(generation.remove(&key));
        assert!(!generation.remove(&key));
        assert!(generation.is_empty());
        assert_eq!(generation.usage_bytes(), 0);
    }

    #[test]
    fn keys_are_sorted() {
        let mut generation = Generation::new("shell-v1");
        generation.put(RequestKey::new(Method::Get, "/b"), response("b"));
        generation.put(RequestKey::new(Method::Get, "/a"), response("a"));

        let keys = generation.keys();
        assert_eq!(keys[0].as_str(), "GET:/a");
        assert_eq!(keys[1].as_str(), "GET:/b");
    }

    #[test]
    fn store_error_display() {
        assert_eq!(
            StoreError::GenerationNotFound.to_string(),
            "generation not found"
        );
        assert_eq!(
            StoreError::Storage("disk gone".to_string()).to_string(),
            "storage error: disk gone"
        );
    }
}
