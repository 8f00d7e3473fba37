use crate::cache::QueryCache;
use crate::domain::operator::{Operator, UpdateOperatorStatus};
use crate::domain::resource::OPERATORS;
use crate::domain::types::OperatorId;
use crate::repository::ResourceWriter;
use crate::services::{MutationOutcome, ServiceResult, json_body, run_mutation};

/// Activates or deactivates an operator account.
pub async fn set_operator_status<W>(
    repo: &W,
    cache: &QueryCache,
    id: OperatorId,
    is_active: bool,
) -> ServiceResult<MutationOutcome<Operator>>
where
    W: ResourceWriter + ?Sized,
{
    let endpoint = format!("{}/status", OPERATORS.item_endpoint(id));
    let body = json_body(&UpdateOperatorStatus { is_active })?;

    let response = run_mutation(cache, &OPERATORS, repo.update(&endpoint, body)).await?;

    Ok(MutationOutcome::from_response(response, "operator"))
}
