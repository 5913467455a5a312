use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigSourceError {
    #[error("Invalid S3 path")]
    InvalidS3Path { path: String },

    #[error("Empty filename")]
    EmptyFilename { path: String },

    #[error("S3 request failed for s3://{bucket}/{key}: {message}")]
    S3 {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Path,
    Remote,
    Io,
    Parse,
    Config,
}

impl ConfigSourceError {
    pub fn s3(bucket: &str, key: &str, message: impl Into<String>) -> Self {
        Self::S3 {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidS3Path { .. } | Self::EmptyFilename { .. } => ErrorCategory::Path,
            Self::S3 { .. } => ErrorCategory::Remote,
            Self::IoError(_) => ErrorCategory::Io,
            Self::TomlError(_) | Self::JsonError(_) | Self::ParseError { .. } => {
                ErrorCategory::Parse
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
        }
    }

    /// True for a local file that is missing or is a directory.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::IoError(e) => matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigSourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_errors_display_short_messages() {
        let err = ConfigSourceError::InvalidS3Path {
            path: "/bucket/cfg.toml".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid S3 path");
        assert_eq!(err.category(), ErrorCategory::Path);

        let err = ConfigSourceError::EmptyFilename {
            path: "s3://bucket".to_string(),
        };
        assert_eq!(err.to_string(), "Empty filename");
    }

    #[test]
    fn test_is_not_found() {
        let err: ConfigSourceError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.is_not_found());

        let err: ConfigSourceError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!err.is_not_found());

        assert!(!ConfigSourceError::s3("b", "k", "boom").is_not_found());
    }
}
