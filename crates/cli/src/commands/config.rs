use anyhow::{Context, Result};
use clap::Subcommand;
use gateway_core::config::AppConfig;

use super::utils::{print_info, print_json, print_success};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration
    Validate,

    /// Print the effective configuration (file plus environment overrides) as JSON
    Show,
}

pub fn handle_config_command(command: ConfigCommands, path: Option<&str>) -> Result<()> {
    let config = match path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    match command {
        ConfigCommands::Validate => {
            print_info("Validating configuration...");
            config.validate().map_err(anyhow::Error::msg)?;
            print_success("Configuration is valid!");
            println!("Configuration Summary:");
            println!("  Delayed: {}", config.endpoints.delayed_url);
            println!("  Live: {}", config.endpoints.live_url);
            println!("  Routing mode: {:?}", config.pipeline.routing_mode);
            println!(
                "  Durable cache: {}",
                config.cache.database_url.as_deref().unwrap_or("disabled")
            );
        }
        ConfigCommands::Show => print_json(&config)?,
    }

    Ok(())
}
