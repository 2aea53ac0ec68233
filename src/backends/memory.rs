//! In-memory backend for exercising the store without touching disk or network.

use super::{Backend, BackendError};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(bytes: impl Into<Vec<u8>>) -> Self {
        let backend = Self::default();
        *backend.blob.lock().unwrap() = Some(bytes.into());
        backend
    }

    pub fn blob(&self) -> Option<Vec<u8>> {
        self.blob.lock().unwrap().clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl Backend for MemoryBackend {
    fn address(&self) -> String {
        "memory".to_string()
    }

    async fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.blob.lock().unwrap().clone())
    }

    async fn write(&self, bytes: Vec<u8>) -> Result<(), BackendError> {
        *self.blob.lock().unwrap() = Some(bytes);
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}
