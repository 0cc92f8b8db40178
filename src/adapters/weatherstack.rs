use crate::core::{WeatherProvider, WeatherReport};
use crate::utils::error::GatewayError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://api.weatherstack.com";

/// Weatherstack embeds failures in a 200 response: `{"success": false, "error": {...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

pub struct WeatherstackClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherstackClient {
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn parse_body(body: &str) -> Result<WeatherReport, GatewayError> {
        let value: serde_json::Value = serde_json::from_str(body)?;

        let envelope: ErrorEnvelope = serde_json::from_value(value.clone())?;
        if let Some(error) = envelope.error {
            tracing::warn!(
                code = ?error.code,
                kind = ?error.kind,
                "Weather provider reported an error"
            );
            return Err(GatewayError::provider(error.code, error.info));
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl WeatherProvider for WeatherstackClient {
    async fn current(&self, location_query: &str) -> Result<WeatherReport, GatewayError> {
        let url = format!("{}/current", self.base_url);
        tracing::debug!("Requesting current weather for '{}'", location_query);

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", self.api_key.as_str()), ("query", location_query)])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("📡 Weather response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body.trim().to_string()
                },
            });
        }

        Self::parse_body(&body)
    }
}
