use crate::domain::model::{NewProperty, Property, PropertyQuery, WeatherReport};
use crate::utils::error::GatewayError;
use async_trait::async_trait;

/// Narrow view of the property data store.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn select(&self, query: &PropertyQuery) -> Result<Vec<Property>, GatewayError>;

    /// Exact id match; `None` when no row matches.
    async fn select_by_id(&self, id: &str) -> Result<Option<Property>, GatewayError>;

    /// Inserts one record and returns the rows the store reports back.
    async fn insert(&self, record: &NewProperty) -> Result<Vec<Property>, GatewayError>;

    /// Returns the number of affected rows; zero is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<u64, GatewayError>;
}

/// Current-conditions lookup against the weather provider.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location_query: &str) -> Result<WeatherReport, GatewayError>;
}

pub trait ServiceConfig: Send + Sync {
    fn listen_port(&self) -> u16;
    fn store_url(&self) -> &str;
    fn store_api_key(&self) -> &str;
    fn properties_table(&self) -> &str;
    fn weather_base_url(&self) -> &str;
    fn weather_api_key(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
}
