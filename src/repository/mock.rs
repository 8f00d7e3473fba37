//! Mock collaborators for isolating view models and services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use crate::query::EffectiveParams;
use crate::repository::errors::RepositoryResult;
use crate::repository::{MutationResponse, ResourceReader, ResourceWriter, RowPage};

mock! {
    pub Reader {}

    #[async_trait]
    impl ResourceReader for Reader {
        async fn list(&self, endpoint: &str, params: &EffectiveParams) -> RepositoryResult<RowPage>;
    }
}

mock! {
    pub Writer {}

    #[async_trait]
    impl ResourceWriter for Writer {
        async fn create(&self, endpoint: &str, body: Value) -> RepositoryResult<MutationResponse>;
        async fn update(&self, endpoint: &str, body: Value) -> RepositoryResult<MutationResponse>;
        async fn delete(&self, endpoint: &str) -> RepositoryResult<MutationResponse>;
    }
}
