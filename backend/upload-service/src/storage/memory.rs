// In-memory object store used by the test suites

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ObjectStore, StorageError};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<Vec<StoredObject>>,
    calls: AtomicUsize,
    /// 1-based put call that fails
    fail_on_call: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), StorageError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(StorageError::Backend(format!("simulated failure on put #{}", call)));
        }

        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(())
    }
}
