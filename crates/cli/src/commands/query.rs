use anyhow::{Context, Result};
use clap::Args;
use gateway_core::{pipeline::QueryOptions, runtime::GatewayRuntime, types::GraphQLRequest};
use std::time::Duration;
use tracing::debug;

use super::utils::{parse_variables, print_json};

#[derive(Args)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["document", "file"])))]
pub struct QueryArgs {
    /// Feature the query belongs to; decides the endpoint under static routing
    #[arg(long)]
    feature: String,

    /// Operation name, also used as the cache key prefix
    #[arg(long)]
    operation: Option<String>,

    /// GraphQL document text
    #[arg(long)]
    document: Option<String>,

    /// Read the GraphQL document from a file
    #[arg(long)]
    file: Option<String>,

    /// Variables as a JSON object
    #[arg(long)]
    variables: Option<String>,

    /// Cache TTL in seconds for this query
    #[arg(long)]
    ttl: Option<u64>,

    /// Bypass the cache for both lookup and store
    #[arg(long)]
    skip_cache: bool,
}

pub async fn handle_query(args: QueryArgs, runtime: &GatewayRuntime) -> Result<()> {
    let document = match (args.document, args.file) {
        (Some(document), _) => document,
        (None, Some(path)) => {
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?
        }
        (None, None) => anyhow::bail!("either --document or --file is required"),
    };

    let mut request = GraphQLRequest::new(document);
    if let Some(variables) = parse_variables(args.variables.as_deref())? {
        request = request.with_variables(variables);
    }
    if let Some(operation) = args.operation {
        request = request.with_operation_name(operation);
    }

    let mut options = QueryOptions::default();
    if let Some(ttl) = args.ttl {
        options = options.with_ttl(Duration::from_secs(ttl));
    }
    if args.skip_cache {
        options = options.skip_cache();
    }

    debug!(feature = %args.feature, "running query");
    let response = runtime.query_client().query(&args.feature, request, options).await?;
    print_json(&response)
}
