pub mod loader;
pub mod mock;
pub mod path;
pub mod source;

pub use crate::domain::model::{ConfigFormat, ConfigSource, ConfigTarget, Credentials, LoadOptions, S3Path};
pub use crate::domain::ports::{Bucket, BucketConnector};
pub use crate::utils::error::Result;
