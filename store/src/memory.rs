//! In-Memory Store
//!
//! `CacheStore` backend holding every generation behind a `spin::RwLock`.
//! This is the default backend for hosts without persistent storage.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use spin::RwLock;

use appshell_http::Response;

use crate::{CacheStore, Generation, RequestKey, StoreError};

/// In-memory response store.
pub struct MemoryStore {
    generations: RwLock<BTreeMap<String, Generation>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            generations: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of generations currently held.
    pub fn generation_count(&self) -> usize {
        self.generations.read().len()
    }

    /// Total body bytes across all generations.
    pub fn usage_bytes(&self) -> usize {
        self.generations
            .read()
            .values()
            .map(|g| g.usage_bytes())
            .sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryStore {
    fn open(&self, generation: &str) -> Result<(), StoreError> {
        let mut generations = self.generations.write();
        if !generations.contains_key(generation) {
            generations.insert(generation.to_string(), Generation::new(generation));
        }
        Ok(())
    }

    fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>, StoreError> {
        Ok(self
            .generations
            .read()
            .get(generation)
            .and_then(|g| g.lookup(key))
            .cloned())
    }

    fn put(&self, generation: &str, key: RequestKey, response: Response) -> Result<(), StoreError> {
        let mut generations = self.generations.write();
        generations
            .entry(generation.to_string())
            .or_insert_with(|| Generation::new(generation))
            .put(key, response);
        Ok(())
    }

    fn put_all(
        &self,
        generation: &str,
        entries: Vec<(RequestKey, Response)>,
    ) -> Result<(), StoreError> {
        // One write lock for the whole batch keeps the commit atomic.
        let mut generations = self.generations.write();
        let target = generations
            .entry(generation.to_string())
            .or_insert_with(|| Generation::new(generation));
        for (key, response) in entries {
            target.put(key, response);
        }
        Ok(())
    }

    fn request_keys(&self, generation: &str) -> Result<Vec<RequestKey>, StoreError> {
        self.generations
            .read()
            .get(generation)
            .map(|g| g.keys())
            .ok_or(StoreError::GenerationNotFound)
    }

    fn generation_names(&self) -> Vec<String> {
        self.generations.read().keys().cloned().collect()
    }

    fn delete_generation(&self, generation: &str) -> Result<bool, StoreError> {
        Ok(self.generations.write().remove(generation).is_some())
    }

    fn contains(&self, generation: &str) -> bool {
        self.generations.read().contains_key(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use appshell_http::{Method, Status};

    fn response(body: &str) -> Response {
        Response::new(Status::OK).with_body(body)
    }

    #[test]
    fn open_is_idempotent() {
        let store = MemoryStore::new();
        store.open("shell-v1").unwrap();
        store.open("shell-v1").unwrap();
        assert_eq!(store.generation_count(), 1);
        assert!(store.contains("shell-v1"));
    }

    #[test]
    fn lookup_missing_generation_is_none() {
        let store = MemoryStore::new();
        let key = RequestKey::new(Method::Get, "/index.html");
        assert!(store.lookup("shell-v9", &key).unwrap().is_none());
    }

    #[test]
    fn put_creates_generation() {
        let store = MemoryStore::new();
        let key = RequestKey::new(Method::Get, "/index.html");
        store
            .put("shell-v1", key.clone(), response("<html>"))
            .unwrap();

        assert!(store.contains("shell-v1"));
        let cached = store.lookup("shell-v1", &key).unwrap().unwrap();
        assert_eq!(cached.text(), Some("<html>".to_string()));
    }

    #[test]
    fn put_all_commits_every_entry() {
        let store = MemoryStore::new();
        store
            .put_all(
                "shell-v1",
                vec![
                    (RequestKey::new(Method::Get, "/"), response("root")),
                    (RequestKey::new(Method::Get, "/app.js"), response("js")),
                ],
            )
            .unwrap();

        let keys = store.request_keys("shell-v1").unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].as_str(), "GET:/");
        assert_eq!(keys[1].as_str(), "GET:/app.js");
    }

    #[test]
    fn request_keys_unknown_generation_errs() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.request_keys("shell-v9"),
            Err(StoreError::GenerationNotFound)
        ));
    }

    #[test]
    fn delete_generation_reports_existence() {
        let store = MemoryStore::new();
        store.open("shell-v1").unwrap();
        assert!(store.delete_generation("shell-v1").unwrap());
        assert!(!store.delete_generation("shell-v1").unwrap());
        assert!(!store.contains("shell-v1"));
    }

    #[test]
    fn generation_names_sorted() {
        let store = MemoryStore::new();
        store.open("shell-v2").unwrap();
        store.open("shell-v1").unwrap();
        assert_eq!(store.generation_names(), vec!["shell-v1", "shell-v2"]);
    }

    #[test]
    fn usage_spans_generations() {
        let store = MemoryStore::new();
        store
            .put("shell-v1", RequestKey::new(Method::Get, "/a"), response("aaaa"))
            .unwrap();
        store
            .put("shell-v2", RequestKey::new(Method::Get, "/b"), response("bb"))
            .unwrap();
        assert_eq!(store.usage_bytes(), 6);
    }
}
