use clap::Parser;
use config_source_s3::utils::{logger, validation::Validate};
use config_source_s3::{load_from_s3, CliConfig};
use serde_json::{Map, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting config-source-s3");
    if config.verbose {
        tracing::debug!("Loading {} (cache: {:?})", config.filename, config.cache_file);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let mut settings = Map::new();
    match load_from_s3(&mut settings, &config.filename, &config.load_options()).await {
        Ok(true) => {
            println!("{}", serde_json::to_string_pretty(&Value::Object(settings))?);
        }
        Ok(false) => {
            tracing::warn!("No settings loaded from {}", config.filename);
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("Failed to load {}: {} ({:?})", config.filename, e, e.category());
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
