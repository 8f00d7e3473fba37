use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::{ListResource, QUESTION_PACKAGES, Resource};
use crate::domain::types::PackageId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionPackage {
    pub id: PackageId,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub total_duration_minutes: Option<u32>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ListResource for QuestionPackage {
    const RESOURCE: &'static Resource = &QUESTION_PACKAGES;
}

/// Body of `PATCH /api/question-packages/{id}/status`.
#[derive(Clone, Debug, Serialize)]
pub struct UpdatePackageStatus {
    pub is_active: bool,
}
