use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::{ListResource, PARTNERS, Resource};
use crate::domain::types::{ContactEmail, ContactName, PartnerId, PartnerName, PhoneNumber};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    /// Missing flags are treated as active.
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl ListResource for Partner {
    const RESOURCE: &'static Resource = &PARTNERS;
}

/// Validated body of `POST /api/partners`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewPartner {
    pub name: PartnerName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<ContactName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<ContactEmail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<PhoneNumber>,
    pub is_active: bool,
}
