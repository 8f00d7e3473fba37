use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::{ListResource, Resource, SCHEDULES};
use crate::domain::types::{PackageId, ParticipantId, PartnerId, ScheduleId};

pub const STATUS_NOT_STARTED: &str = "Tes Belum Dimulai";
pub const STATUS_STARTING_SOON: &str = "Tes Akan Segera Dimulai";
pub const STATUS_IN_PROGRESS: &str = "Tes Sedang Berlangsung";
pub const STATUS_FINISHED: &str = "Tes Telah Selesai";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PackageRef {
    pub id: PackageId,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PartnerRef {
    pub id: PartnerId,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Decimal string as sent by the API, e.g. `"150000.00"`.
    pub price: String,
    pub capacity: u32,
    #[serde(default)]
    pub is_partner: bool,
    #[serde(default)]
    pub partner: Option<PartnerRef>,
    #[serde(default)]
    pub packages: Vec<PackageRef>,
    pub status: String,
    #[serde(default)]
    pub quiz_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Schedule {
    /// Whether the test window has closed.
    pub fn is_finished(&self) -> bool {
        self.status == STATUS_FINISHED
    }
}

impl ListResource for Schedule {
    const RESOURCE: &'static Resource = &SCHEDULES;
}

/// Validated body of `POST /api/schedules`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewSchedule {
    pub date: NaiveDate,
    #[serde(with = "hour_minute")]
    pub start_time: NaiveTime,
    pub price: u64,
    pub capacity: u32,
    pub is_partner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<PartnerId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub package_ids: Vec<PackageId>,
}

/// Body of `POST /api/schedules/{id}/participants`.
#[derive(Clone, Debug, Serialize)]
pub struct AddScheduleParticipant {
    pub user_id: ParticipantId,
}

mod hour_minute {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }
}
