//! Collaborators talking to the remote REST API.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::pagination::PaginatedResult;
use crate::query::EffectiveParams;
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod errors;
#[cfg(feature = "http")]
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

#[cfg(feature = "http")]
pub use http::HttpRepository;

/// Page of rows not yet decoded into a resource type.
pub type RowPage = PaginatedResult<Value>;

/// Success body of a create/update/delete call: an optional message plus
/// whatever resource payload the endpoint returns.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct MutationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl MutationResponse {
    /// Decodes the payload field `field`, e.g. `"partner"`.
    pub fn decode<T: DeserializeOwned>(&self, field: &str) -> RepositoryResult<T> {
        let value = self.payload.get(field).cloned().ok_or_else(|| {
            RepositoryError::InvalidResponse(format!("missing `{field}` in response"))
        })?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
pub trait ResourceReader: Send + Sync {
    /// `GET endpoint` with `params` as the query string.
    async fn list(&self, endpoint: &str, params: &EffectiveParams) -> RepositoryResult<RowPage>;
}

#[async_trait]
pub trait ResourceWriter: Send + Sync {
    /// `POST endpoint` with a JSON body.
    async fn create(&self, endpoint: &str, body: Value) -> RepositoryResult<MutationResponse>;
    /// `PATCH endpoint` with a JSON body.
    async fn update(&self, endpoint: &str, body: Value) -> RepositoryResult<MutationResponse>;
    /// `DELETE endpoint`.
    async fn delete(&self, endpoint: &str) -> RepositoryResult<MutationResponse>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn mutation_response_keeps_payload() {
        let response: MutationResponse = serde_json::from_value(json!({
            "message": "Partner dibuat",
            "partner": {"id": 4, "name": "Mitra"}
        }))
        .unwrap();

        assert_eq!(response.message.as_deref(), Some("Partner dibuat"));
        let partner: Value = response.decode("partner").unwrap();
        assert_eq!(partner["id"], 4);
        assert!(matches!(
            response.decode::<Value>("schedule"),
            Err(RepositoryError::InvalidResponse(_))
        ));
    }
}
