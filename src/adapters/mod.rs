// Adapters layer: concrete implementations for external systems (store, weather provider, GraphQL/HTTP surface).

pub mod graphql;
pub mod http;
pub mod supabase;
pub mod weatherstack;

pub use supabase::SupabaseStore;
pub use weatherstack::WeatherstackClient;
