use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::schedule::NewSchedule;
use crate::domain::types::{PackageId, PartnerId};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_partner_fields"))]
/// Form data for creating a test schedule.
pub struct AddScheduleForm {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub start_time: String,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 1))]
    pub capacity: u32,
    #[serde(default)]
    pub is_partner: bool,
    #[serde(default)]
    pub partner_id: Option<i64>,
    #[serde(default)]
    pub package_ids: Vec<i64>,
}

/// Partner-run schedules need a partner and at least one package.
fn validate_partner_fields(form: &AddScheduleForm) -> Result<(), ValidationError> {
    if !form.is_partner {
        return Ok(());
    }
    if form.partner_id.is_none() {
        return Err(
            ValidationError::new("partner_required").with_message("Select a partner".into())
        );
    }
    if form.package_ids.is_empty() {
        return Err(ValidationError::new("packages_required")
            .with_message("Select at least one package".into()));
    }
    Ok(())
}

impl TryFrom<AddScheduleForm> for NewSchedule {
    type Error = FormError;

    fn try_from(form: AddScheduleForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let date = NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate)?;
        let start_time = NaiveTime::parse_from_str(form.start_time.trim(), "%H:%M")
            .map_err(|_| FormError::InvalidTime)?;
        let price = u64::try_from(form.price).map_err(|_| FormError::InvalidPrice)?;

        let partner_id = if form.is_partner {
            form.partner_id
                .map(PartnerId::new)
                .transpose()
                .map_err(|_| FormError::InvalidPartnerId)?
        } else {
            None
        };
        let package_ids = form
            .package_ids
            .into_iter()
            .map(PackageId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| FormError::InvalidPackageId)?;

        Ok(Self {
            date,
            start_time,
            price,
            capacity: form.capacity,
            is_partner: form.is_partner,
            partner_id,
            package_ids,
        })
    }
}
