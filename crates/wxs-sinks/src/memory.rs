//! In-memory object store and notifier

use std::collections::BTreeMap;
use std::sync::Mutex;

use wxs_core::{
    NotificationTransport, ObjectStore, PipelineResult, PublishAck, PublishRequest, PutObjectAck,
    PutObjectRequest,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: String,
    pub content_type: String,
}

/// Keeps objects keyed by `(bucket, key)`; acknowledges with a fixed status
pub struct MemoryObjectStore {
    status: u16,
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::with_status(200)
    }

    /// Acknowledge every put with `status`; objects are only kept for 2xx
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    /// Stored keys of a bucket, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> PipelineResult<PutObjectAck> {
        if wxs_core::is_success_status(self.status) {
            let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
            objects.insert(
                (request.bucket, request.key),
                StoredObject {
                    body: request.body,
                    content_type: request.content_type,
                },
            );
        }
        Ok(PutObjectAck {
            status: self.status,
        })
    }
}

/// Records every published alert
pub struct MemoryNotifier {
    status: u16,
    published: Mutex<Vec<PublishRequest>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::with_status(200)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            published: Mutex::new(Vec::new()),
        }
    }

    /// Everything published so far, in publish order
    pub fn published(&self) -> Vec<PublishRequest> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NotificationTransport for MemoryNotifier {
    async fn publish(&self, request: PublishRequest) -> PipelineResult<PublishAck> {
        let mut published = self.published.lock().unwrap_or_else(|e| e.into_inner());
        published.push(request);
        Ok(PublishAck {
            message_id: Some(format!("mem-{}", published.len())),
            status: self.status,
        })
    }
}
