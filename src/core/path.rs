use crate::domain::model::S3Path;
use crate::utils::error::{ConfigSourceError, Result};

const S3_SCHEME: &str = "s3://";

/// Split `s3://bucket/key` into bucket and key.
///
/// The key may be empty; trailing slashes are dropped from it.
pub fn split_s3_path(path: &str) -> Result<(String, String)> {
    let invalid = || ConfigSourceError::InvalidS3Path {
        path: path.to_string(),
    };

    let rest = path.strip_prefix(S3_SCHEME).ok_or_else(invalid)?;
    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));

    if bucket.is_empty() {
        return Err(invalid());
    }

    Ok((bucket.to_string(), key.trim_end_matches('/').to_string()))
}

impl S3Path {
    pub fn parse(path: &str) -> Result<Self> {
        let (bucket, key) = split_s3_path(path)?;
        Ok(Self { bucket, key })
    }
}

impl std::fmt::Display for S3Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(path: &str) -> (String, String) {
        split_s3_path(path).unwrap()
    }

    #[test]
    fn test_split_s3_path() {
        assert_eq!(split("s3://my-bucket"), ("my-bucket".into(), "".into()));
        assert_eq!(
            split("s3://my-bucket/filename"),
            ("my-bucket".into(), "filename".into())
        );
        assert_eq!(split("s3://my-bucket/dir/"), ("my-bucket".into(), "dir".into()));
        assert_eq!(
            split("s3://my-bucket/dir/filename"),
            ("my-bucket".into(), "dir/filename".into())
        );
    }

    #[test]
    fn test_split_s3_path_invalid() {
        for path in [
            "s3:/my-bucket",
            "s3:/my-bucket/filename",
            "/my-bucket/dir/",
            "my-bucket/dir/filename",
            "s3://",
            "s3:///key",
        ] {
            let err = split_s3_path(path).unwrap_err();
            assert!(
                matches!(err, ConfigSourceError::InvalidS3Path { .. }),
                "{path} should be rejected"
            );
            assert_eq!(err.to_string(), "Invalid S3 path");
        }
    }

    #[test]
    fn test_s3_path_display() {
        let path = S3Path::parse("s3://configs/app/prod.toml").unwrap();
        assert_eq!(path.bucket, "configs");
        assert_eq!(path.key, "app/prod.toml");
        assert_eq!(path.to_string(), "s3://configs/app/prod.toml");
    }
}
