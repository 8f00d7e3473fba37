//! Form definitions backing the create dialogs.

use thiserror::Error;
use validator::ValidationErrors;

pub mod partners;
pub mod schedules;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid date")]
    InvalidDate,

    #[error("invalid time")]
    InvalidTime,

    #[error("invalid price")]
    InvalidPrice,

    #[error("invalid partner id")]
    InvalidPartnerId,

    #[error("invalid package id")]
    InvalidPackageId,
}

/// Trims an optional text input, mapping blank values to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
