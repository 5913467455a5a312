pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

#[cfg(feature = "s3")]
pub use crate::config::s3::{AwsBucket, AwsBucketConnector};
#[cfg(feature = "s3")]
pub use crate::core::loader::load_from_s3;

pub use crate::core::loader::S3ConfigLoader;
pub use crate::core::path::split_s3_path;
pub use crate::core::source::load_to;
pub use domain::model::{ConfigFormat, ConfigSource, ConfigTarget, Credentials, LoadOptions, S3Path};
pub use utils::error::{ConfigSourceError, Result};
