//! Mutations behind the admin dialogs.
//!
//! Every successful create/update/delete marks all cached lists of the
//! touched resource stale. Failures reach the caller and leave the cache
//! alone.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::cache::QueryCache;
use crate::domain::resource::Resource;
use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::repository::MutationResponse;
use crate::repository::errors::{GENERIC_ERROR_MESSAGE, RepositoryError, RepositoryResult};

pub mod operators;
pub mod partners;
pub mod question_packages;
pub mod schedules;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Text to show in the dialog that started the mutation.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Repository(err) => err.user_message(),
            ServiceError::Form(err) => err.to_string(),
            ServiceError::TypeConstraint(err) => err.to_string(),
            ServiceError::Internal(_) => GENERIC_ERROR_MESSAGE.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Message relayed from the API plus the affected item, when it was returned.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationOutcome<T> {
    pub message: Option<String>,
    pub item: Option<T>,
}

impl<T: DeserializeOwned> MutationOutcome<T> {
    fn from_response(response: MutationResponse, field: &str) -> Self {
        let item = match response.decode(field) {
            Ok(item) => Some(item),
            Err(err) => {
                log::debug!("Mutation response carries no usable `{field}`: {err}");
                None
            }
        };

        Self {
            message: response.message,
            item,
        }
    }
}

fn json_body<T: Serialize>(payload: &T) -> ServiceResult<Value> {
    serde_json::to_value(payload).map_err(|err| {
        log::error!("Failed to serialize request body: {err}");
        ServiceError::Internal(err.to_string())
    })
}

/// Awaits `mutation` and invalidates `resource` when it succeeded.
async fn run_mutation<F>(
    cache: &QueryCache,
    resource: &Resource,
    mutation: F,
) -> ServiceResult<MutationResponse>
where
    F: Future<Output = RepositoryResult<MutationResponse>>,
{
    let response = mutation.await.map_err(|err| {
        log::error!("Mutation on `{}` failed: {err}", resource.name);
        err
    })?;

    let stale = cache.invalidate(resource.name);
    log::info!(
        "Mutation on `{}` succeeded, {stale} cached lists marked stale",
        resource.name
    );

    Ok(response)
}
