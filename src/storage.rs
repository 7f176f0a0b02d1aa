//! Storage-collaborator boundary.
//!
//! The object-storage service that delivers input bytes and receives output
//! artifacts is an external, managed collaborator. The invoker takes it as an
//! [`ObjectStore`] at construction time so the pipeline can run against a
//! deterministic in-memory store in tests without a live service.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::BoxError;

/// Interface to the external object-storage collaborator.
pub trait ObjectStore {
    /// Read the blob at a logical location in full.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, BoxError>;

    /// Hand off one finished artifact. Called at most once per invocation;
    /// ownership of the bytes conceptually transfers to the collaborator.
    fn store(&self, path: &str, bytes: &[u8]) -> Result<(), BoxError>;
}

#[derive(Debug, thiserror::Error)]
#[error("object not found: {0}")]
struct NotFound(String);

/// In-memory object store.
///
/// Backs tests and local runs; a production deployment supplies an adapter
/// over its managed storage service instead.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, e.g. a test input document.
    pub fn insert(&self, location: impl Into<String>, bytes: Vec<u8>) {
        self.objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(location.into(), bytes);
    }

    /// Read back a stored object, if present.
    pub fn get(&self, location: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(location)
            .cloned()
    }

    /// All stored paths, sorted for deterministic assertions.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

impl ObjectStore for MemoryStore {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, BoxError> {
        self.get(location)
            .ok_or_else(|| Box::new(NotFound(location.to_string())) as BoxError)
    }

    fn store(&self, path: &str, bytes: &[u8]) -> Result<(), BoxError> {
        self.insert(path, bytes.to_vec());
        Ok(())
    }
}
