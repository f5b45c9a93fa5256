//! In-memory object store used by unit tests

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crate::traits::{ListOptions, ListResult, ObjectStore, RemoteObjectInfo, UploadRequest};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub etag: String,
    pub headers: Vec<(String, String)>,
}

/// Bucket held in a sorted map; ETags are the quoted MD5 of the body
#[derive(Debug)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    page_size: usize,
    list_calls: AtomicUsize,
    put_calls: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_page_size(1000)
    }
}

impl MemoryStore {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
            list_calls: AtomicUsize::new(0),
            put_calls: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, key: &str, body: &[u8]) {
        let object = StoredObject {
            body: body.to_vec(),
            etag: Fingerprint::of_bytes(body).etag(),
            headers: Vec::new(),
        };
        self.objects.lock().unwrap().insert(key.to_string(), object);
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self) -> Result<bool> {
        Ok(true)
    }

    async fn list_objects(&self, options: ListOptions) -> Result<ListResult> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().unwrap();
        let page_size = options
            .max_keys
            .map_or(self.page_size, |max| self.page_size.min(max as usize));

        let mut matching = objects
            .iter()
            .filter(|(key, _)| key.starts_with(&options.prefix))
            .filter(|(key, _)| {
                options
                    .continuation_token
                    .as_ref()
                    .is_none_or(|token| key.as_str() > token.as_str())
            });

        let items: Vec<RemoteObjectInfo> = matching
            .by_ref()
            .take(page_size)
            .map(|(key, object)| RemoteObjectInfo {
                key: key.clone(),
                etag: Some(object.etag.clone()),
                size_bytes: object.body.len() as i64,
                last_modified: None,
            })
            .collect();
        let truncated = matching.next().is_some();

        Ok(ListResult {
            continuation_token: if truncated {
                items.last().map(|item| item.key.clone())
            } else {
                None
            },
            items,
            truncated,
        })
    }

    async fn put_object(&self, request: &UploadRequest) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let body = std::fs::read(&request.source).map_err(|e| Error::local_io(&request.source, e))?;
        let object = StoredObject {
            etag: Fingerprint::of_bytes(&body).etag(),
            body,
            headers: request
                .headers
                .iter()
                .map(|h| (h.name.clone(), h.value.clone()))
                .collect(),
        };
        self.objects
            .lock()
            .unwrap()
            .insert(request.key.clone(), object);
        Ok(())
    }
}
