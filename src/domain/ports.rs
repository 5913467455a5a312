use crate::domain::model::Credentials;
use crate::utils::error::Result;
use std::future::Future;
use std::path::Path;

pub trait Bucket: Send + Sync {
    fn download_bytes(&self, key: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Write the object to `dest`, creating parent directories and
    /// replacing any existing file.
    fn download_file(&self, key: &str, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

pub trait BucketConnector: Send + Sync {
    type Bucket: Bucket;

    fn get_bucket(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Bucket>> + Send;
}
