//! GraphQL schema for the property API.
//!
//! Field names and nullability follow the public contract: `zipCode`,
//! `weatherData` and `created_at` on `Property`, snake_case on `WeatherData`.

use crate::core::{CreatePropertyInput, Property, PropertyOrchestrator, PropertyQuery, WeatherSnapshot};
use crate::utils::error::PropertyError;
use juniper::{
    graphql_object, EmptySubscription, FieldError, FieldResult, GraphQLInputObject, GraphQLObject,
    Object, RootNode, Value,
};
use serde_json::Number;
use std::sync::Arc;

/// Shared resources available to all resolvers
#[derive(Clone)]
pub struct GraphQLContext {
    pub orchestrator: Arc<PropertyOrchestrator>,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(orchestrator: Arc<PropertyOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[derive(Debug, Clone, GraphQLObject)]
#[graphql(name = "WeatherData", rename_all = "none")]
pub struct WeatherData {
    pub observation_time: Option<String>,
    pub temperature: Option<i32>,
    pub weather_code: Option<i32>,
    pub weather_icons: Option<Vec<Option<String>>>,
    pub weather_descriptions: Option<Vec<Option<String>>>,
    pub wind_speed: Option<i32>,
    pub wind_degree: Option<i32>,
    pub wind_dir: Option<String>,
    pub pressure: Option<i32>,
    pub precip: Option<f64>,
    pub humidity: Option<i32>,
    pub cloudcover: Option<i32>,
    pub feelslike: Option<i32>,
    pub uv_index: Option<i32>,
    pub visibility: Option<i32>,
    pub is_day: Option<String>,
}

// GraphQL `Int` is 32-bit; fractional readings are rounded, anything out of range is null.
fn int(n: Option<Number>) -> Option<i32> {
    let n = n?;
    match n.as_i64() {
        Some(v) => i32::try_from(v).ok(),
        None => n
            .as_f64()
            .map(f64::round)
            .filter(|v| *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
            .map(|v| v as i32),
    }
}

impl From<WeatherSnapshot> for WeatherData {
    fn from(w: WeatherSnapshot) -> Self {
        let nullable = |items: Option<Vec<String>>| items.map(|v| v.into_iter().map(Some).collect());
        Self {
            observation_time: w.observation_time,
            temperature: int(w.temperature),
            weather_code: int(w.weather_code),
            weather_icons: nullable(w.weather_icons),
            weather_descriptions: nullable(w.weather_descriptions),
            wind_speed: int(w.wind_speed),
            wind_degree: int(w.wind_degree),
            wind_dir: w.wind_dir,
            pressure: int(w.pressure),
            precip: w.precip.and_then(|p| p.as_f64()),
            humidity: int(w.humidity),
            cloudcover: int(w.cloudcover),
            feelslike: int(w.feelslike),
            uv_index: int(w.uv_index),
            visibility: int(w.visibility),
            is_day: w.is_day,
        }
    }
}

#[derive(Debug, Clone, GraphQLObject)]
#[graphql(name = "Property")]
pub struct PropertyData {
    pub id: String,
    pub city: String,
    pub street: String,
    pub state: String,
    pub zip_code: String,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub weather_data: Option<WeatherData>,
    #[graphql(name = "created_at")]
    pub created_at: Option<String>,
}

impl From<Property> for PropertyData {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            city: p.city,
            street: p.street,
            state: p.state,
            zip_code: p.zip_code,
            lat: p.lat,
            long: p.long,
            weather_data: p.weather_data.map(WeatherData::from),
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, GraphQLInputObject)]
#[graphql(name = "CreatePropertyInput")]
pub struct CreatePropertyInputData {
    pub city: String,
    pub street: String,
    pub state: String,
    pub zip_code: String,
}

impl From<CreatePropertyInputData> for CreatePropertyInput {
    fn from(input: CreatePropertyInputData) -> Self {
        Self {
            city: input.city,
            street: input.street,
            state: input.state,
            zip_code: input.zip_code,
        }
    }
}

/// Caller sees the classified message; the code extension names the kind.
fn field_error(err: PropertyError) -> FieldError {
    let mut extensions = Object::with_capacity(1);
    extensions.add_field("code", Value::scalar(err.root_kind().code().to_string()));
    FieldError::new(err.to_string(), Value::Object(extensions))
}

pub struct Query;

#[graphql_object(context = GraphQLContext)]
impl Query {
    /// All properties, optionally filtered by city/state/zipCode and sorted by creation date
    async fn properties(
        ctx: &GraphQLContext,
        city: Option<String>,
        state: Option<String>,
        zip_code: Option<String>,
        sort: Option<String>,
    ) -> FieldResult<Vec<PropertyData>> {
        let query = PropertyQuery::from_args(city, state, zip_code, sort.as_deref());
        let properties = ctx.orchestrator.list(query).await.map_err(field_error)?;
        Ok(properties.into_iter().map(PropertyData::from).collect())
    }

    async fn property(ctx: &GraphQLContext, id: String) -> FieldResult<Option<PropertyData>> {
        let property = ctx.orchestrator.get(&id).await.map_err(field_error)?;
        Ok(property.map(PropertyData::from))
    }
}

pub struct Mutation;

#[graphql_object(context = GraphQLContext)]
impl Mutation {
    /// Create a property; current weather for its address is captured once, at creation
    async fn create_property(
        ctx: &GraphQLContext,
        input: CreatePropertyInputData,
    ) -> FieldResult<Option<PropertyData>> {
        let property = ctx
            .orchestrator
            .create(input.into())
            .await
            .map_err(field_error)?;
        Ok(Some(property.into()))
    }

    async fn delete_property(ctx: &GraphQLContext, id: String) -> FieldResult<Option<bool>> {
        let deleted = ctx.orchestrator.delete(&id).await.map_err(field_error)?;
        Ok(Some(deleted))
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<GraphQLContext>>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
