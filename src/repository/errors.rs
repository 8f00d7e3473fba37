use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Message shown when the API gave nothing better to relay.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RepositoryError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Classifies a non-success response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let body: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let message =
            api_error_message(&body).unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

        match status {
            401 => RepositoryError::Unauthorized,
            404 => RepositoryError::NotFound(message),
            422 => RepositoryError::Validation {
                message,
                fields: field_errors(&body),
            },
            _ => RepositoryError::Server { status, message },
        }
    }

    /// Text to display next to the list or form that triggered the request.
    ///
    /// Transport failures get a generic message; server messages are relayed
    /// verbatim.
    pub fn user_message(&self) -> String {
        match self {
            RepositoryError::Transport(_) | RepositoryError::InvalidResponse(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            RepositoryError::Unauthorized => self.to_string(),
            RepositoryError::NotFound(message)
            | RepositoryError::Validation { message, .. }
            | RepositoryError::Server { message, .. } => message.clone(),
        }
    }
}

/// Extracts the most specific message from an API error body: the first
/// message of the first invalid field, then `message`, then `error`.
pub fn api_error_message(body: &Value) -> Option<String> {
    let body = body.as_object()?;

    let first_field_error = body
        .get("errors")
        .and_then(Value::as_object)
        .and_then(|errors| errors.values().next())
        .and_then(Value::as_array)
        .and_then(|messages| messages.first())
        .and_then(Value::as_str);

    first_field_error
        .or_else(|| body.get("message").and_then(Value::as_str))
        .or_else(|| body.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

fn field_errors(body: &Value) -> BTreeMap<String, Vec<String>> {
    body.get("errors")
        .and_then(Value::as_object)
        .map(|errors| {
            errors
                .iter()
                .map(|(field, messages)| {
                    let messages = messages
                        .as_array()
                        .map(|list| {
                            list.iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    (field.clone(), messages)
                })
                .collect()
        })
        .unwrap_or_default()
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::InvalidResponse(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::InvalidResponse(err.to_string())
        } else {
            RepositoryError::Transport(err.to_string())
        }
    }
}
