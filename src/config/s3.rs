use crate::domain::model::Credentials;
use crate::domain::ports::{Bucket, BucketConnector};
use crate::utils::error::{ConfigSourceError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials as StaticCredentials, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
use aws_sdk_s3::Client as S3Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Builds S3 clients from the AWS SDK default configuration chain.
#[derive(Debug, Clone, Default)]
pub struct AwsBucketConnector;

impl AwsBucketConnector {
    pub fn new() -> Self {
        Self
    }
}

impl BucketConnector for AwsBucketConnector {
    type Bucket = AwsBucket;

    async fn get_bucket(&self, name: &str, credentials: &Credentials) -> Result<AwsBucket> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        match (&credentials.access_key, &credentials.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                loader = loader.credentials_provider(StaticCredentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "config-source-s3",
                ));
            }
            (None, None) => {
                if let Some(profile) = &credentials.profile {
                    loader = loader.profile_name(profile.clone());
                }
            }
            _ => {
                return Err(ConfigSourceError::ConfigError {
                    message: "access key and secret key must be given together".to_string(),
                });
            }
        }

        if let Some(region) = &credentials.region {
            loader = loader.region(Region::new(region.clone()));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &credentials.endpoint_url {
            builder = builder.endpoint_url(endpoint.clone()).force_path_style(true);
        }

        tracing::debug!("Created S3 client for bucket {}", name);
        Ok(AwsBucket::new(S3Client::from_conf(builder.build()), name.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AwsBucket {
    client: S3Client,
    bucket: String,
}

impl AwsBucket {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    async fn get_object(&self, key: &str) -> Result<GetObjectOutput> {
        self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.get_object_error(key, e))
    }

    fn get_object_error(&self, key: &str, err: SdkError<GetObjectError>) -> ConfigSourceError {
        let message = match err.into_service_error() {
            GetObjectError::NoSuchKey(_) => "object does not exist".to_string(),
            GetObjectError::InvalidObjectState(e) => format!("invalid object state: {}", e),
            err => match (err.code(), err.message()) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (Some(code), None) => code.to_string(),
                _ => err.to_string(),
            },
        };
        ConfigSourceError::s3(&self.bucket, key, message)
    }
}

impl Bucket for AwsBucket {
    async fn download_bytes(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self.get_object(key).await?;
        let data = resp.body.collect().await.map_err(|e| {
            ConfigSourceError::s3(&self.bucket, key, format!("Failed to collect S3 data: {}", e))
        })?;
        Ok(data.into_bytes().to_vec())
    }

    /// Streams the object into a sibling `.part` file and renames it over
    /// `dest` once complete, so an interrupted download never leaves a
    /// truncated cache behind.
    async fn download_file(&self, key: &str, dest: &Path) -> Result<()> {
        let resp = self.get_object(key).await?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(dest);
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut body = resp.body;
        let written = async {
            while let Some(chunk) = body.try_next().await.map_err(|e| {
                ConfigSourceError::s3(&self.bucket, key, format!("Failed to read S3 data: {}", e))
            })? {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok::<_, ConfigSourceError>(())
        }
        .await;
        drop(file);

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, dest).await?;
        Ok(())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
