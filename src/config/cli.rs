use crate::core::path::split_s3_path;
use crate::domain::model::{ConfigFormat, Credentials, LoadOptions};
use crate::utils::error::{ConfigSourceError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "config-source-s3")]
#[command(about = "Load a settings file from S3 and print it as JSON")]
pub struct CliConfig {
    /// Remote settings file, e.g. s3://my-bucket/app/settings.toml
    pub filename: String,

    #[arg(long, help = "Local cache file for the downloaded settings")]
    pub cache_file: Option<PathBuf>,

    #[arg(long, help = "Download again even if the cache file exists")]
    pub update_cache: bool,

    #[arg(long, help = "Treat a missing remote or cached file as empty settings")]
    pub silent: bool,

    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    #[arg(long, value_enum, help = "Settings format (inferred from the file name if omitted)")]
    pub format: Option<ConfigFormat>,

    #[arg(long, help = "Replace ${VAR} references with environment values")]
    pub expand_env: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            profile: self.profile.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::new()
            .with_credentials(self.credentials())
            .update_cache(self.update_cache)
            .silent(self.silent)
            .expand_env(self.expand_env);
        if let Some(cache) = &self.cache_file {
            options = options.with_cache(cache.clone());
        }
        if let Some(format) = self.format {
            options = options.with_format(format);
        }
        options
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let (bucket, _) = split_s3_path(&self.filename)?;
        validation::validate_s3_bucket_name("filename", &bucket)?;

        if let Some(cache) = &self.cache_file {
            validation::validate_path("cache_file", &cache.to_string_lossy())?;
        }

        if let Some(endpoint) = &self.endpoint_url {
            validation::validate_url("endpoint_url", endpoint)?;
        }

        if let Some(region) = &self.region {
            validation::validate_aws_region("region", region)?;
        }

        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(ConfigSourceError::ConfigError {
                message: "--access-key and --secret-key must be given together".to_string(),
            });
        }

        tracing::debug!("CLI configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["config-source-s3"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_load_options_from_args() {
        let config = parse(&[
            "s3://configs/app.json",
            "--cache-file",
            "/tmp/app.json",
            "--update-cache",
            "--silent",
            "--format",
            "json",
            "--profile",
            "staging",
        ]);
        let options = config.load_options();

        assert_eq!(options.cache_filename, Some(PathBuf::from("/tmp/app.json")));
        assert!(options.update_cache);
        assert!(options.silent);
        assert_eq!(options.format, Some(ConfigFormat::Json));
        assert_eq!(options.credentials.profile.as_deref(), Some("staging"));
    }

    #[test]
    fn test_validate() {
        assert!(parse(&["s3://configs/app.toml"]).validate().is_ok());
        assert!(parse(&["/configs/app.toml"]).validate().is_err());
        assert!(parse(&["s3://Bad_Bucket/app.toml"]).validate().is_err());
        assert!(parse(&["s3://10.0.0.1/app.toml"]).validate().is_err());
        assert!(parse(&["s3://configs/app.toml", "--endpoint-url", "ftp://minio"])
            .validate()
            .is_err());
        assert!(parse(&["s3://configs/app.toml", "--access-key", "AKID", "--secret-key", "s"])
            .validate()
            .is_ok());
    }
}
