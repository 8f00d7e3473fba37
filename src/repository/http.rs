//! reqwest implementation of the API collaborators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::models::config::ClientConfig;
use crate::query::EffectiveParams;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{MutationResponse, ResourceReader, ResourceWriter, RowPage};

#[derive(Clone, Debug)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(config: &ClientConfig) -> RepositoryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                RepositoryError::Transport("api token is not a valid header value".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn execute(request: RequestBuilder) -> RepositoryResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::debug!("API responded with {status}: {body}");
            return Err(RepositoryError::from_response(status.as_u16(), &body));
        }

        Ok(body)
    }

    async fn mutate(request: RequestBuilder) -> RepositoryResult<MutationResponse> {
        let body = Self::execute(request).await?;
        if body.trim().is_empty() {
            return Ok(MutationResponse::default());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ResourceReader for HttpRepository {
    async fn list(&self, endpoint: &str, params: &EffectiveParams) -> RepositoryResult<RowPage> {
        let body = Self::execute(self.client.get(self.url(endpoint)).query(params)).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ResourceWriter for HttpRepository {
    async fn create(&self, endpoint: &str, body: Value) -> RepositoryResult<MutationResponse> {
        Self::mutate(self.client.post(self.url(endpoint)).json(&body)).await
    }

    async fn update(&self, endpoint: &str, body: Value) -> RepositoryResult<MutationResponse> {
        Self::mutate(self.client.patch(self.url(endpoint)).json(&body)).await
    }

    async fn delete(&self, endpoint: &str) -> RepositoryResult<MutationResponse> {
        Self::mutate(self.client.delete(self.url(endpoint))).await
    }
}
