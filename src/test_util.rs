//! In-memory object store used to exercise the handlers without a
//! storage service.

use crate::client::ObjectStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Fake object store backed by a map of (bucket, key) to content.
/// Listings are paginated with a configurable page size, and can
/// re-serve the last key of a page at the start of the next one, the
/// way a listing can straddle a page boundary.
pub(crate) struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    page_size: usize,
    repeat_page_boundary: bool,
    failing_destination: Option<String>,
    pub copies: Mutex<Vec<(String, String, String, String)>>,
    pub puts: Mutex<Vec<(String, String)>>,
    pub deletes: Mutex<Vec<(String, Vec<String>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        assert!(page_size > 0);
        MemoryStore {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
            repeat_page_boundary: false,
            failing_destination: None,
            copies: Mutex::new(Vec::new()),
            puts: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    /// Serve the last key of the previous page again on each
    /// subsequent page.
    pub fn repeating_page_boundaries(mut self) -> Self {
        self.repeat_page_boundary = true;
        self
    }

    /// Fail any copy targeting the given destination key.
    pub fn failing_copies_to(mut self, key: &str) -> Self {
        self.failing_destination = Some(String::from(key));
        self
    }

    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert((String::from(bucket), String::from(key)), body.to_vec());
    }

    pub fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(String::from(bucket), String::from(key)))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    fn matching_keys(&self, bucket: &str, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        next: Option<&str>,
    ) -> Result<(Vec<String>, Option<String>)> {
        let keys = self.matching_keys(bucket, prefix);
        let start: usize = match next {
            Some(token) => token.parse()?,
            None => 0,
        };
        let end = usize::min(start + self.page_size, keys.len());
        let mut page = Vec::new();
        if self.repeat_page_boundary && start > 0 {
            page.push(keys[start - 1].clone());
        }
        page.extend(keys[start..end].iter().cloned());
        let token = if end < keys.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok((page, token))
    }

    async fn copy(
        &self,
        source_bucket: &str,
        source_key: &str,
        bucket: &str,
        key: &str,
    ) -> Result<()> {
        self.copies.lock().unwrap().push((
            String::from(source_bucket),
            String::from(source_key),
            String::from(bucket),
            String::from(key),
        ));
        if self.failing_destination.as_deref() == Some(key) {
            return Err(anyhow!(
                "Injected copy failure for destination {:?}",
                key
            ));
        }
        let body = self
            .body(source_bucket, source_key)
            .ok_or_else(|| anyhow!("No such key {:?} in bucket {:?}", source_key, source_bucket))?;
        self.insert(bucket, key, &body);
        Ok(())
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.puts
            .lock()
            .unwrap()
            .push((String::from(bucket), String::from(key)));
        self.insert(bucket, key, &body);
        Ok(())
    }

    async fn delete_all(&self, bucket: &str, keys: Vec<String>) -> Result<()> {
        self.deletes
            .lock()
            .unwrap()
            .push((String::from(bucket), keys.clone()));
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&(String::from(bucket), key));
        }
        Ok(())
    }
}
