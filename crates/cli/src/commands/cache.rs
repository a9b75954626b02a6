use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use gateway_core::runtime::GatewayRuntime;

use super::utils::{print_info, print_json, print_success};

#[derive(Clone, Copy, ValueEnum)]
pub enum CacheName {
    Metadata,
    Queries,
    All,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show memory-tier size and durable-tier readiness
    Stats,

    /// Remove every entry from both tiers
    Clear {
        /// Which cache to clear
        #[arg(long, value_enum, default_value = "all")]
        which: CacheName,
    },

    /// Remove a single key
    Delete {
        /// Cache key, `<operation>:<variables json>` for query entries
        key: String,

        #[arg(long, value_enum, default_value = "queries")]
        which: CacheName,
    },
}

pub async fn handle_cache_command(command: CacheCommands, runtime: &GatewayRuntime) -> Result<()> {
    match command {
        CacheCommands::Stats => {
            print_json(&[runtime.metadata_cache().stats(), runtime.query_cache().stats()])?;
        }
        CacheCommands::Clear { which } => {
            if matches!(which, CacheName::Metadata | CacheName::All) {
                runtime.metadata_cache().clear();
            }
            if matches!(which, CacheName::Queries | CacheName::All) {
                runtime.query_cache().clear();
            }
            flush(runtime).await;
            print_success("Cache cleared");
        }
        CacheCommands::Delete { key, which } => {
            if matches!(which, CacheName::Metadata | CacheName::All) {
                runtime.metadata_cache().delete(&key);
            }
            if matches!(which, CacheName::Queries | CacheName::All) {
                runtime.query_cache().delete(&key);
            }
            flush(runtime).await;
            print_info(&format!("Deleted {key}"));
        }
    }

    Ok(())
}

async fn flush(runtime: &GatewayRuntime) {
    tokio::join!(runtime.metadata_cache().flush(), runtime.query_cache().flush());
}
