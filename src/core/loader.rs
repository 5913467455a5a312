use crate::core::path::split_s3_path;
use crate::core::source::load_to_with;
use crate::domain::model::{ConfigFormat, ConfigSource, ConfigTarget, LoadOptions};
use crate::domain::ports::{Bucket, BucketConnector};
use crate::utils::error::{ConfigSourceError, Result};
use std::path::Path;

/// Loads settings files stored in S3 through a [`BucketConnector`].
pub struct S3ConfigLoader<C: BucketConnector> {
    connector: C,
}

impl<C: BucketConnector> S3ConfigLoader<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Load `s3://bucket/key` into `config`.
    ///
    /// With a cache file the object is downloaded there first, unless the
    /// file already exists and `update_cache` is off, and settings are then
    /// read from the cache. Remote failures return `Ok(false)` in silent
    /// mode; malformed paths always fail.
    pub async fn load_from_s3<T>(
        &self,
        config: &mut T,
        filename: &str,
        options: &LoadOptions,
    ) -> Result<bool>
    where
        T: ConfigTarget + ?Sized,
    {
        let (bucket_name, key) = split_s3_path(filename)?;
        if key.is_empty() {
            return Err(ConfigSourceError::EmptyFilename {
                path: filename.to_string(),
            });
        }

        let format = options.format.unwrap_or_else(|| match &options.cache_filename {
            Some(cache) if cache.extension().is_some() => ConfigFormat::from_path(cache),
            _ => ConfigFormat::from_path(&key),
        });

        let source = match &options.cache_filename {
            Some(cache) => {
                if !self.fetch_to_cache(&bucket_name, &key, cache, options).await? {
                    return Ok(false);
                }
                ConfigSource::File(cache.clone())
            }
            None => match self.fetch_bytes(&bucket_name, &key, options).await {
                Ok(data) => ConfigSource::Bytes(data),
                Err(e) => return silence(e, filename, options.silent),
            },
        };

        let loaded = load_to_with(config, source, format, options.silent, options.expand_env).await?;
        if loaded {
            tracing::info!("Loaded config from {}", filename);
        }
        Ok(loaded)
    }

    async fn fetch_bytes(&self, bucket_name: &str, key: &str, options: &LoadOptions) -> Result<Vec<u8>> {
        let bucket = self
            .connector
            .get_bucket(bucket_name, &options.credentials)
            .await?;
        tracing::debug!("Downloading s3://{}/{} into memory", bucket_name, key);
        bucket.download_bytes(key).await
    }

    /// Returns `Ok(false)` when the download failed in silent mode.
    async fn fetch_to_cache(
        &self,
        bucket_name: &str,
        key: &str,
        cache: &Path,
        options: &LoadOptions,
    ) -> Result<bool> {
        if !options.update_cache && tokio::fs::try_exists(cache).await? {
            tracing::debug!("Using cached config {}", cache.display());
            return Ok(true);
        }

        let result = async {
            let bucket = self
                .connector
                .get_bucket(bucket_name, &options.credentials)
                .await?;
            tracing::debug!(
                "Downloading s3://{}/{} to {}",
                bucket_name,
                key,
                cache.display()
            );
            bucket.download_file(key, cache).await
        }
        .await;

        match result {
            Ok(()) => Ok(true),
            Err(e) => silence(e, &format!("s3://{}/{}", bucket_name, key), options.silent),
        }
    }
}

fn silence(err: ConfigSourceError, filename: &str, silent: bool) -> Result<bool> {
    if silent && matches!(err, ConfigSourceError::S3 { .. }) {
        tracing::warn!("Skipping config {}: {}", filename, err);
        return Ok(false);
    }
    Err(err)
}

#[cfg(feature = "s3")]
impl S3ConfigLoader<crate::config::s3::AwsBucketConnector> {
    pub fn aws() -> Self {
        Self::new(crate::config::s3::AwsBucketConnector::new())
    }
}

/// Load `filename` from S3 using the AWS SDK default configuration.
#[cfg(feature = "s3")]
pub async fn load_from_s3<T>(config: &mut T, filename: &str, options: &LoadOptions) -> Result<bool>
where
    T: ConfigTarget + ?Sized,
{
    S3ConfigLoader::aws().load_from_s3(config, filename, options).await
}
