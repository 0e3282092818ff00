//! Transient object handles for in-memory blobs
//!
//! A handle exposes a blob under a `blob:` URL for the lifetime of an
//! `ObjectUrl` guard. Dropping the guard revokes the URL.

use crate::map::Blob;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const OBJECT_URL_PREFIX: &str = "blob:glance/";

/// Table of live object URLs, shared by cloning
#[derive(Debug, Clone, Default)]
pub struct ObjectUrls {
    entries: Arc<Mutex<HashMap<String, Blob>>>,
}

impl ObjectUrls {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and return a guard that revokes it on drop
    pub fn create(&self, blob: Blob) -> ObjectUrl {
        let url = format!("{}{}", OBJECT_URL_PREFIX, uuid::Uuid::new_v4());
        self.lock().insert(url.clone(), blob);
        ObjectUrl {
            url,
            table: self.clone(),
        }
    }

    /// Look up the blob behind a live URL
    pub fn read(&self, url: &str) -> Option<Blob> {
        self.lock().get(url).cloned()
    }

    /// Revoke a URL; returns whether it was live
    pub fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    /// Check whether a string is an object URL issued by this module
    pub fn is_object_url(url: &str) -> bool {
        url.starts_with(OBJECT_URL_PREFIX)
    }

    /// Number of live URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Blob>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A live object URL, revoked when dropped
#[derive(Debug)]
pub struct ObjectUrl {
    url: String,
    table: ObjectUrls,
}

impl ObjectUrl {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.table.revoke(&self.url);
    }
}
