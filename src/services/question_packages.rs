use crate::cache::QueryCache;
use crate::domain::question_package::{QuestionPackage, UpdatePackageStatus};
use crate::domain::resource::QUESTION_PACKAGES;
use crate::domain::types::PackageId;
use crate::repository::ResourceWriter;
use crate::services::{MutationOutcome, ServiceResult, json_body, run_mutation};

/// Publishes or hides a question package.
pub async fn set_package_status<W>(
    repo: &W,
    cache: &QueryCache,
    id: PackageId,
    is_active: bool,
) -> ServiceResult<MutationOutcome<QuestionPackage>>
where
    W: ResourceWriter + ?Sized,
{
    let endpoint = format!("{}/status", QUESTION_PACKAGES.item_endpoint(id));
    let body = json_body(&UpdatePackageStatus { is_active })?;

    let response = run_mutation(cache, &QUESTION_PACKAGES, repo.update(&endpoint, body)).await?;

    Ok(MutationOutcome::from_response(response, "package"))
}

/// Deletes a question package. Returns the API message.
pub async fn delete_package<W>(
    repo: &W,
    cache: &QueryCache,
    id: PackageId,
) -> ServiceResult<Option<String>>
where
    W: ResourceWriter + ?Sized,
{
    let endpoint = QUESTION_PACKAGES.item_endpoint(id);

    let response = run_mutation(cache, &QUESTION_PACKAGES, repo.delete(&endpoint)).await?;

    Ok(response.message)
}
