use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::{ListResource, OPERATORS, Resource};
use crate::domain::types::OperatorId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ListResource for Operator {
    const RESOURCE: &'static Resource = &OPERATORS;
}

/// Body of `PATCH /api/admin/operators/{id}/status`.
#[derive(Clone, Debug, Serialize)]
pub struct UpdateOperatorStatus {
    pub is_active: bool,
}
