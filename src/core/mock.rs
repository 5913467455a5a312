//! In-memory [`BucketConnector`] for tests.
//!
//! Objects are registered up front with [`MockBucketConnector::with_object`];
//! every connector and bucket call is appended to a shared log so tests can
//! assert the exact sequence of remote operations.

use crate::domain::model::Credentials;
use crate::domain::ports::{Bucket, BucketConnector};
use crate::utils::error::{ConfigSourceError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetBucket {
        name: String,
        credentials: Credentials,
    },
    DownloadBytes {
        bucket: String,
        key: String,
    },
    DownloadFile {
        bucket: String,
        key: String,
        dest: PathBuf,
    },
}

#[derive(Debug, Default)]
struct MockState {
    objects: HashMap<(String, String), Vec<u8>>,
    calls: Vec<MockCall>,
    fail_get_bucket: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MockBucketConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockBucketConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, data: impl Into<Vec<u8>>) -> Self {
        self.lock()
            .objects
            .insert((bucket.to_string(), key.to_string()), data.into());
        self
    }

    /// Make every `get_bucket` call fail with `message`.
    pub fn failing_get_bucket(self, message: &str) -> Self {
        self.lock().fail_get_bucket = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl BucketConnector for MockBucketConnector {
    type Bucket = MockBucket;

    async fn get_bucket(&self, name: &str, credentials: &Credentials) -> Result<MockBucket> {
        let mut state = self.lock();
        state.calls.push(MockCall::GetBucket {
            name: name.to_string(),
            credentials: credentials.clone(),
        });
        if let Some(message) = &state.fail_get_bucket {
            return Err(ConfigSourceError::s3(name, "", message.clone()));
        }
        Ok(MockBucket {
            name: name.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockBucket {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockBucket {
    fn fetch(&self, key: &str, call: MockCall) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(call);
        state
            .objects
            .get(&(self.name.clone(), key.to_string()))
            .cloned()
            .ok_or_else(|| ConfigSourceError::s3(&self.name, key, "NoSuchKey"))
    }
}

impl Bucket for MockBucket {
    async fn download_bytes(&self, key: &str) -> Result<Vec<u8>> {
        self.fetch(
            key,
            MockCall::DownloadBytes {
                bucket: self.name.clone(),
                key: key.to_string(),
            },
        )
    }

    async fn download_file(&self, key: &str, dest: &Path) -> Result<()> {
        let data = self.fetch(
            key,
            MockCall::DownloadFile {
                bucket: self.name.clone(),
                key: key.to_string(),
                dest: dest.to_path_buf(),
            },
        )?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, data).await?;
        Ok(())
    }
}
