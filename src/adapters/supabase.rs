use crate::core::{NewProperty, Property, PropertyQuery, PropertyStore, SortDirection};
use crate::utils::error::GatewayError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

/// PostgREST error payload returned by Supabase on non-2xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Property store backed by a Supabase (PostgREST) table.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(
        base_url: &str,
        api_key: &str,
        table: &str,
        timeout_seconds: u64,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Query-string pairs for a list request.
    fn list_params(query: &PropertyQuery) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];

        for (column, value) in query.filter.predicates() {
            // `*` is PostgREST's URL-safe alias for the `%` wildcard
            params.push((column.to_string(), format!("ilike.*{}*", value)));
        }

        if let Some(direction) = query.sort {
            let order = match direction {
                SortDirection::Ascending => "created_at.asc",
                SortDirection::Descending => "created_at.desc",
            };
            params.push(("order".to_string(), order.to_string()));
        }

        params
    }

    async fn read_rows(response: Response) -> Result<Vec<Property>, GatewayError> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("📡 Store response status: {}", status);

        if !status.is_success() {
            return Err(Self::error_from_body(status.as_u16(), &body));
        }

        // DELETE/POST without representation can legitimately return an empty body
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn error_from_body(status: u16, body: &str) -> GatewayError {
        match serde_json::from_str::<PostgrestError>(body) {
            Ok(error) => {
                tracing::debug!(
                    code = ?error.code,
                    details = ?error.details,
                    hint = ?error.hint,
                    "Store rejected request"
                );
                GatewayError::store(error.code, error.message)
            }
            Err(_) if body.trim().is_empty() => GatewayError::Unknown,
            Err(_) => GatewayError::Status {
                status,
                message: body.trim().to_string(),
            },
        }
    }
}

#[async_trait]
impl PropertyStore for SupabaseStore {
    async fn select(&self, query: &PropertyQuery) -> Result<Vec<Property>, GatewayError> {
        let params = Self::list_params(query);
        tracing::debug!("Querying {} with {:?}", self.endpoint, params);

        let response = self
            .authorized(self.client.get(&self.endpoint))
            .query(&params)
            .send()
            .await?;

        Self::read_rows(response).await
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<Property>, GatewayError> {
        let response = self
            .authorized(self.client.get(&self.endpoint))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))])
            .send()
            .await?;

        let mut rows = Self::read_rows(response).await?;
        match rows.len() {
            0 | 1 => Ok(rows.pop()),
            actual => Err(GatewayError::UnexpectedRows {
                expected: 1,
                actual,
            }),
        }
    }

    async fn insert(&self, record: &NewProperty) -> Result<Vec<Property>, GatewayError> {
        let response = self
            .authorized(self.client.post(&self.endpoint))
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;

        Self::read_rows(response).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, GatewayError> {
        let response = self
            .authorized(self.client.delete(&self.endpoint))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        let rows = Self::read_rows(response).await?;
        Ok(rows.len() as u64)
    }
}
