use anyhow::Result;
use clap::Subcommand;
use gateway_core::{
    endpoint::{choose_optimal, ProbeOutcome, ProbeRecord},
    runtime::GatewayRuntime,
    types::{EndpointId, HealthMetric},
};

use super::utils::print_json;

#[derive(Subcommand)]
pub enum EndpointCommands {
    /// Probe both endpoints and print their health
    Status {
        /// Print the raw performance status as JSON
        #[arg(long)]
        json: bool,

        /// Number of recent probes to list per endpoint
        #[arg(long, default_value_t = 0)]
        history: usize,
    },

    /// Probe both endpoints and print the URL of the faster usable one
    Optimal,

    /// Show which endpoint a feature is routed to
    Route {
        /// Feature name, e.g. `marketplace`
        feature: String,
    },

    /// List every known feature and its endpoint
    Features,
}

pub async fn handle_endpoint_command(command: EndpointCommands, runtime: &GatewayRuntime) -> Result<()> {
    let selector = runtime.query_client().selector();

    match command {
        EndpointCommands::Status { json, history } => {
            let monitor = runtime.health_monitor();
            let status = monitor.refresh().await;
            if json {
                if history == 0 {
                    return print_json(&status);
                }
                return print_json(&serde_json::json!({
                    "status": status,
                    "history": {
                        "delayed": recent(monitor.history(EndpointId::Delayed), history),
                        "live": recent(monitor.history(EndpointId::Live), history),
                    },
                }));
            }
            for id in EndpointId::ALL {
                print_metric(id, &selector.endpoints().get(id).url, status.get(id));
                if history > 0 {
                    println!("  Recent probes:");
                    for record in recent(monitor.history(id), history) {
                        println!("    {}", format_record(&record));
                    }
                }
            }
            println!("Optimal: {}", choose_optimal(&status).as_str());
        }
        EndpointCommands::Optimal => {
            println!("{}", runtime.query_client().optimal_endpoint_url().await);
        }
        EndpointCommands::Route { feature } => {
            let endpoint = selector.for_feature(&feature);
            println!("{feature} -> {} ({})", endpoint.id.as_str(), endpoint.url);
        }
        EndpointCommands::Features => {
            for (feature, id) in selector.policy().features() {
                println!("  {feature:<20} {}", id.as_str());
            }
        }
    }

    Ok(())
}

fn print_metric(id: EndpointId, url: &str, metric: &HealthMetric) {
    println!("[{}] {url}", id.as_str());
    println!("  State: {:?}", metric.state);
    println!("  Healthy: {}", metric.is_healthy);
    println!("  Effective latency: {}ms", metric.response_time_ms);
    if let Some(rtt) = metric.round_trip_ms {
        println!("  Round trip: {rtt}ms");
    }
    println!("  Last known block: {}", metric.last_known_block);
    if let Some(reason) = metric.degraded {
        println!("  Degraded: {reason:?}");
    }
}

/// Keeps the newest `limit` records, oldest first.
fn recent(mut records: Vec<ProbeRecord>, limit: usize) -> Vec<ProbeRecord> {
    let skip = records.len().saturating_sub(limit);
    records.drain(..skip);
    records
}

fn format_record(record: &ProbeRecord) -> String {
    let outcome = match &record.outcome {
        ProbeOutcome::Healthy { block, .. } => format!("healthy at block {block}"),
        ProbeOutcome::IndexingErrors { block, .. } => format!("indexing errors at block {block}"),
        ProbeOutcome::NoData { .. } => "no data".to_string(),
        ProbeOutcome::GraphQLErrors { message, .. } => format!("graphql errors: {message}"),
        ProbeOutcome::TransportFailure { error } => format!("transport failure: {error}"),
    };
    format!(
        "{} {outcome} ({}ms)",
        record.checked_at.format("%Y-%m-%d %H:%M:%S"),
        record.response_time_ms
    )
}
