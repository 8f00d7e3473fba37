use serde::Deserialize;
use validator::Validate;

use crate::domain::partner::NewPartner;
use crate::domain::types::{ContactEmail, ContactName, PartnerName, PhoneNumber};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Form data for registering a partner institution.
pub struct AddPartnerForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    /// New partners are active unless stated otherwise.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl TryFrom<AddPartnerForm> for NewPartner {
    type Error = FormError;

    fn try_from(form: AddPartnerForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let name = PartnerName::new(form.name).map_err(|_| FormError::InvalidName)?;
        let contact_name = non_blank(form.contact_name)
            .map(ContactName::new)
            .transpose()
            .map_err(|_| FormError::InvalidName)?;
        let contact_email = non_blank(form.contact_email)
            .map(ContactEmail::new)
            .transpose()
            .map_err(|_| FormError::InvalidEmail)?;
        let contact_phone = non_blank(form.contact_phone)
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|_| FormError::InvalidPhoneNumber)?;

        Ok(Self {
            name,
            code: non_blank(form.code),
            contact_name,
            contact_email,
            contact_phone,
            is_active: form.is_active.unwrap_or(true),
        })
    }
}
