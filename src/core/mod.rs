pub mod orchestrator;

pub use crate::domain::model::{
    CreatePropertyInput, NewProperty, Property, PropertyFilter, PropertyQuery, SortDirection,
    WeatherReport, WeatherSnapshot,
};
pub use crate::domain::ports::{PropertyStore, ServiceConfig, WeatherProvider};
pub use crate::utils::error::Result;
pub use orchestrator::PropertyOrchestrator;
