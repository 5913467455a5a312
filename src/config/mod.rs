#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "s3")]
pub mod s3;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
