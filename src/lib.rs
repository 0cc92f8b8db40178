pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::graphql::{create_schema, GraphQLContext, Schema};
pub use crate::adapters::http::{build_router, AppState};
pub use crate::adapters::{SupabaseStore, WeatherstackClient};
pub use crate::config::{CliConfig, TomlConfig};
pub use crate::core::orchestrator::PropertyOrchestrator;
pub use crate::utils::error::{ErrorKind, GatewayError, PropertyError, Result};
