use crate::cache::QueryCache;
use crate::domain::partner::{NewPartner, Partner};
use crate::domain::resource::PARTNERS;
use crate::forms::partners::AddPartnerForm;
use crate::repository::ResourceWriter;
use crate::services::{MutationOutcome, ServiceResult, json_body, run_mutation};

/// Validates the form and registers the partner.
pub async fn create_partner<W>(
    repo: &W,
    cache: &QueryCache,
    form: AddPartnerForm,
) -> ServiceResult<MutationOutcome<Partner>>
where
    W: ResourceWriter + ?Sized,
{
    let new_partner = NewPartner::try_from(form)?;
    let body = json_body(&new_partner)?;

    let response = run_mutation(cache, &PARTNERS, repo.create(PARTNERS.endpoint, body)).await?;

    Ok(MutationOutcome::from_response(response, "partner"))
}
