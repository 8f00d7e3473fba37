use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::{ListResource, PARTICIPANTS, Resource};
use crate::domain::types::ParticipantId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Whether the participant finished registration (verified and profiled).
    pub fn is_registered(&self) -> bool {
        self.email_verified_at.is_some() && self.profile_completed_at.is_some()
    }
}

impl ListResource for Participant {
    const RESOURCE: &'static Resource = &PARTICIPANTS;
}
