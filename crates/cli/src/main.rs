use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gateway_core::{config::AppConfig, runtime::GatewayRuntime};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
use commands::{
    handle_cache_command, handle_config_command, handle_endpoint_command, handle_query, CacheCommands,
    ConfigCommands, EndpointCommands, QueryArgs,
};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Gateway CLI - inspect endpoints, run queries and manage the query cache")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file (falls back to `GATEWAY_CONFIG`, then config/gateway.toml)
    #[arg(long, global = true, env = "GATEWAY_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Endpoint health and routing
    #[command(flatten)]
    Endpoint(EndpointCommands),

    /// Run a GraphQL query through the pipeline
    Query(QueryArgs),

    /// Cache inspection and maintenance
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
        let level = &config.logging.level;
        EnvFilter::new(format!("warn,gateway_core={level},gateway_cli={level}"))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}")),
        None => AppConfig::load().context("Failed to load configuration"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Config(command) => return handle_config_command(command, cli.config.as_deref()),
        other => other,
    };

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    let runtime = GatewayRuntime::builder()
        .with_config(config)
        .disable_health_monitor()
        .build()
        .await
        .context("Failed to initialize gateway runtime")?;

    let result = match command {
        Commands::Endpoint(command) => handle_endpoint_command(command, &runtime).await,
        Commands::Query(args) => handle_query(args, &runtime).await,
        Commands::Cache(command) => handle_cache_command(command, &runtime).await,
        Commands::Config(_) => Ok(()),
    };

    runtime.shutdown().await;
    result
}
