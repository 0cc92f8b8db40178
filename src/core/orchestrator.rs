use crate::core::{
    CreatePropertyInput, NewProperty, Property, PropertyQuery, PropertyStore, WeatherProvider,
};
use crate::utils::error::{CreateStageError, PropertyError, Result};
use std::sync::Arc;

/// Implements the property use cases on top of the store and weather gateways.
#[derive(Clone)]
pub struct PropertyOrchestrator {
    store: Arc<dyn PropertyStore>,
    weather: Arc<dyn WeatherProvider>,
}

impl PropertyOrchestrator {
    pub fn new(store: Arc<dyn PropertyStore>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { store, weather }
    }

    pub async fn list(&self, query: PropertyQuery) -> Result<Vec<Property>> {
        tracing::debug!(
            filter = ?query.filter,
            sort = query.sort.map(|s| s.as_str()),
            "Listing properties"
        );

        let properties = self.store.select(&query).await.map_err(|source| {
            let err = PropertyError::FetchCollection { source };
            tracing::error!("❌ {}", err.chain());
            err
        })?;

        tracing::info!("Fetched {} properties", properties.len());
        Ok(properties)
    }

    /// `Ok(None)` when no property has this id.
    pub async fn get(&self, id: &str) -> Result<Option<Property>> {
        tracing::debug!(id, "Fetching property");

        let property = self.store.select_by_id(id).await.map_err(|source| {
            let err = PropertyError::FetchItem { source };
            tracing::error!(id, "❌ {}", err.chain());
            err
        })?;

        if property.is_none() {
            tracing::debug!(id, "Property not found");
        }
        Ok(property)
    }

    /// Looks up current weather for the address, then persists the combined record.
    ///
    /// The insert is the only write and always the last step, so a failed
    /// weather lookup leaves nothing behind.
    pub async fn create(&self, input: CreatePropertyInput) -> Result<Property> {
        let location_query = input.location_query();
        tracing::debug!(location = %location_query, "Creating property");

        let outcome = self.create_inner(input, &location_query).await;
        match outcome {
            Ok(property) => {
                tracing::info!(id = %property.id, location = %location_query, "✅ Property created");
                Ok(property)
            }
            Err(source) => {
                let err = PropertyError::CreateProperty { source };
                tracing::error!(location = %location_query, "❌ {}", err.chain());
                Err(err)
            }
        }
    }

    async fn create_inner(
        &self,
        input: CreatePropertyInput,
        location_query: &str,
    ) -> std::result::Result<Property, CreateStageError> {
        let report = self
            .weather
            .current(location_query)
            .await
            .map_err(|source| {
                if source.is_provider_error() {
                    CreateStageError::WeatherLookup { source }
                } else {
                    CreateStageError::WeatherUnavailable { source }
                }
            })?;

        if report.location.as_ref().map_or(true, |l| l.lat.is_none() || l.lon.is_none()) {
            tracing::warn!(location = %location_query, "Weather provider returned no coordinates");
        }

        let record = NewProperty::from_lookup(input, report);
        let rows = self
            .store
            .insert(&record)
            .await
            .map_err(|source| CreateStageError::Insert { source })?;

        rows.into_iter().next().ok_or(CreateStageError::EmptyInsert)
    }

    /// Deleting an id that does not exist succeeds.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        tracing::debug!(id, "Deleting property");

        let affected = self.store.delete_by_id(id).await.map_err(|source| {
            let err = PropertyError::DeleteProperty { source };
            tracing::error!(id, "❌ {}", err.chain());
            err
        })?;

        tracing::info!(id, affected, "Delete completed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{SortDirection, WeatherLocation, WeatherReport, WeatherSnapshot};
    use crate::utils::error::{ErrorKind, GatewayError};
    use async_trait::async_trait;
    use serde_json::Number;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStore {
        rows: Arc<Mutex<Vec<Property>>>,
        fail_with: Option<String>,
        inserts: Arc<Mutex<usize>>,
        last_query: Arc<Mutex<Option<PropertyQuery>>>,
    }

    impl MockStore {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn check(&self) -> std::result::Result<(), GatewayError> {
            match &self.fail_with {
                Some(message) => Err(GatewayError::store(None, Some(message.clone()))),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl PropertyStore for MockStore {
        async fn select(
            &self,
            query: &PropertyQuery,
        ) -> std::result::Result<Vec<Property>, GatewayError> {
            self.check()?;
            *self.last_query.lock().await = Some(query.clone());
            let rows = self.rows.lock().await;
            Ok(rows.iter().filter(|p| query.filter.matches(p)).cloned().collect())
        }

        async fn select_by_id(
            &self,
            id: &str,
        ) -> std::result::Result<Option<Property>, GatewayError> {
            self.check()?;
            let rows = self.rows.lock().await;
            Ok(rows.iter().find(|p| p.id == id).cloned())
        }

        async fn insert(
            &self,
            record: &NewProperty,
        ) -> std::result::Result<Vec<Property>, GatewayError> {
            *self.inserts.lock().await += 1;
            self.check()?;
            let mut rows = self.rows.lock().await;
            let property = Property {
                id: format!("prop-{}", rows.len() + 1),
                city: record.city.clone(),
                street: record.street.clone(),
                state: record.state.clone(),
                zip_code: record.zip_code.clone(),
                lat: record.lat,
                long: record.long,
                weather_data: record.weather_data.clone(),
                created_at: Some(format!("2025-01-0{}T00:00:00+00:00", rows.len() + 1)),
            };
            rows.push(property.clone());
            Ok(vec![property])
        }

        async fn delete_by_id(&self, id: &str) -> std::result::Result<u64, GatewayError> {
            self.check()?;
            let mut rows = self.rows.lock().await;
            let before = rows.len();
            rows.retain(|p| p.id != id);
            Ok((before - rows.len()) as u64)
        }
    }

    struct MockWeather {
        response: std::result::Result<WeatherReport, String>,
        queries: Arc<Mutex<Vec<String>>>,
    }

    impl MockWeather {
        fn sunny(lat: Option<f64>, lon: Option<f64>) -> Self {
            Self {
                response: Ok(WeatherReport {
                    current: Some(WeatherSnapshot {
                        temperature: Some(Number::from(24)),
                        weather_descriptions: Some(vec!["Sunny".to_string()]),
                        is_day: Some("yes".to_string()),
                        ..WeatherSnapshot::default()
                    }),
                    location: Some(WeatherLocation {
                        lat,
                        lon,
                        ..WeatherLocation::default()
                    }),
                }),
                queries: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn provider_error(info: &str) -> Self {
            Self {
                response: Err(info.to_string()),
                queries: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for MockWeather {
        async fn current(
            &self,
            location_query: &str,
        ) -> std::result::Result<WeatherReport, GatewayError> {
            self.queries.lock().await.push(location_query.to_string());
            match &self.response {
                Ok(report) => Ok(report.clone()),
                Err(info) => Err(GatewayError::provider(Some(615), Some(info.clone()))),
            }
        }
    }

    fn input(city: &str, state: &str, zip: &str) -> CreatePropertyInput {
        CreatePropertyInput {
            city: city.to_string(),
            street: "1 Test St".to_string(),
            state: state.to_string(),
            zip_code: zip.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_merges_weather_and_coordinates() {
        let store = MockStore::default();
        let weather = Arc::new(MockWeather::sunny(Some(33.6), Some(-111.7)));
        let orchestrator = PropertyOrchestrator::new(Arc::new(store.clone()), weather.clone());

        let property = orchestrator
            .create(input("Fountain Hills", "AZ", "85268"))
            .await
            .unwrap();

        assert_eq!(property.city, "Fountain Hills");
        assert_eq!(property.lat, Some(33.6));
        assert_eq!(property.long, Some(-111.7));
        assert_eq!(property.weather_data.unwrap().temperature, Some(Number::from(24)));
        assert_eq!(
            weather.queries.lock().await.as_slice(),
            ["Fountain Hills, AZ, 85268, United States"]
        );

        let fetched = orchestrator.get(&property.id).await.unwrap();
        assert_eq!(fetched.unwrap().id, property.id);
    }

    #[tokio::test]
    async fn test_create_without_coordinates_leaves_them_unset() {
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(MockStore::default()),
            Arc::new(MockWeather::sunny(None, None)),
        );

        let property = orchestrator.create(input("Austin", "TX", "78701")).await.unwrap();

        assert_eq!(property.lat, None);
        assert_eq!(property.long, None);
        assert!(property.weather_data.is_some());
    }

    #[tokio::test]
    async fn test_create_weather_error_skips_insert() {
        let store = MockStore::default();
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(store.clone()),
            Arc::new(MockWeather::provider_error("Your API request failed.")),
        );

        let err = orchestrator
            .create(input("Phoenix", "AZ", "85001"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::CreateProperty);
        assert!(err.is_weather_lookup());
        assert_eq!(
            err.to_string(),
            "Failed to create property: Failed to fetch weather data: Your API request failed."
        );
        assert_eq!(*store.inserts.lock().await, 0);
        assert!(store.rows.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_unreachable_weather_keeps_key_out_of_error() {
        let store = MockStore::default();
        let weather =
            crate::adapters::WeatherstackClient::new("http://127.0.0.1:9", "SECRET-WS-KEY", 2)
                .unwrap();
        let orchestrator = PropertyOrchestrator::new(Arc::new(store.clone()), Arc::new(weather));

        let err = orchestrator
            .create(input("Phoenix", "AZ", "85001"))
            .await
            .unwrap_err();

        assert!(!err.to_string().contains("SECRET-WS-KEY"));
        assert!(!err.chain().contains("SECRET-WS-KEY"));
        assert!(!err.is_weather_lookup());
        assert_eq!(err.root_kind(), ErrorKind::CreateProperty);
        assert!(!err.to_string().contains(crate::utils::error::messages::WEATHER_API));
        assert_eq!(*store.inserts.lock().await, 0);
    }

    #[tokio::test]
    async fn test_create_insert_failure() {
        let store = MockStore::failing("duplicate key value");
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(store.clone()),
            Arc::new(MockWeather::sunny(Some(1.0), Some(2.0))),
        );

        let err = orchestrator
            .create(input("Phoenix", "AZ", "85001"))
            .await
            .unwrap_err();

        assert_eq!(err.root_kind(), ErrorKind::CreateProperty);
        assert_eq!(
            err.to_string(),
            "Failed to create property: duplicate key value"
        );
        assert_eq!(*store.inserts.lock().await, 1);
    }

    #[tokio::test]
    async fn test_list_passes_query_and_filters() {
        let store = MockStore::default();
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(store.clone()),
            Arc::new(MockWeather::sunny(None, None)),
        );
        orchestrator.create(input("Phoenix", "AZ", "85001")).await.unwrap();
        orchestrator.create(input("Austin", "TX", "78701")).await.unwrap();

        let query = PropertyQuery::from_args(None, Some("az".into()), None, Some("DESC"));
        let result = orchestrator.list(query).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].city, "Phoenix");
        let seen = store.last_query.lock().await.clone().unwrap();
        assert_eq!(seen.sort, Some(SortDirection::Descending));
    }

    #[tokio::test]
    async fn test_list_empty_is_ok() {
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(MockStore::default()),
            Arc::new(MockWeather::sunny(None, None)),
        );

        let result = orchestrator.list(PropertyQuery::default()).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_message_is_terse() {
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(MockStore::failing("permission denied for table properties")),
            Arc::new(MockWeather::sunny(None, None)),
        );

        let err = orchestrator.list(PropertyQuery::default()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FetchCollection);
        assert_eq!(err.to_string(), "Failed to fetch properties.");
        assert!(err.chain().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_get_missing_is_none_and_failure_is_error() {
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(MockStore::default()),
            Arc::new(MockWeather::sunny(None, None)),
        );
        assert!(orchestrator.get("does-not-exist").await.unwrap().is_none());

        let failing = PropertyOrchestrator::new(
            Arc::new(MockStore::failing("invalid input syntax for type uuid")),
            Arc::new(MockWeather::sunny(None, None)),
        );
        let err = failing.get("abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FetchItem);
        assert_eq!(
            err.to_string(),
            "Failed to fetch property: invalid input syntax for type uuid"
        );
    }

    #[tokio::test]
    async fn test_delete_existing_and_missing() {
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(MockStore::default()),
            Arc::new(MockWeather::sunny(None, None)),
        );
        let property = orchestrator.create(input("Phoenix", "AZ", "85001")).await.unwrap();

        assert!(orchestrator.delete(&property.id).await.unwrap());
        assert!(orchestrator.get(&property.id).await.unwrap().is_none());
        assert!(orchestrator.delete(&property.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_failure() {
        let orchestrator = PropertyOrchestrator::new(
            Arc::new(MockStore::failing("connection refused")),
            Arc::new(MockWeather::sunny(None, None)),
        );

        let err = orchestrator.delete("prop-1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeleteProperty);
        assert_eq!(err.to_string(), "Failed to delete property: connection refused");
    }
}
