pub mod cache;
pub mod config;
pub mod endpoint;
pub mod query;
pub mod utils;

pub use cache::{handle_cache_command, CacheCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use endpoint::{handle_endpoint_command, EndpointCommands};
pub use query::{handle_query, QueryArgs};
