use crate::cache::QueryCache;
use crate::domain::resource::SCHEDULES;
use crate::domain::schedule::{AddScheduleParticipant, NewSchedule, Schedule};
use crate::domain::types::{ParticipantId, ScheduleId};
use crate::forms::schedules::AddScheduleForm;
use crate::repository::ResourceWriter;
use crate::services::{MutationOutcome, ServiceResult, json_body, run_mutation};

/// Validates the form and creates the schedule.
pub async fn create_schedule<W>(
    repo: &W,
    cache: &QueryCache,
    form: AddScheduleForm,
) -> ServiceResult<MutationOutcome<Schedule>>
where
    W: ResourceWriter + ?Sized,
{
    let new_schedule = NewSchedule::try_from(form)?;
    let body = json_body(&new_schedule)?;

    let response = run_mutation(cache, &SCHEDULES, repo.create(SCHEDULES.endpoint, body)).await?;

    Ok(MutationOutcome::from_response(response, "schedule"))
}

/// Registers a participant for a schedule.
pub async fn add_participant<W>(
    repo: &W,
    cache: &QueryCache,
    schedule_id: ScheduleId,
    user_id: ParticipantId,
) -> ServiceResult<Option<String>>
where
    W: ResourceWriter + ?Sized,
{
    let endpoint = format!("{}/participants", SCHEDULES.item_endpoint(schedule_id));
    let body = json_body(&AddScheduleParticipant { user_id })?;

    let response = run_mutation(cache, &SCHEDULES, repo.create(&endpoint, body)).await?;

    Ok(response.message)
}

/// Removes a participant from a schedule.
pub async fn remove_participant<W>(
    repo: &W,
    cache: &QueryCache,
    schedule_id: ScheduleId,
    user_id: ParticipantId,
) -> ServiceResult<Option<String>>
where
    W: ResourceWriter + ?Sized,
{
    let endpoint = format!(
        "{}/participants/{user_id}",
        SCHEDULES.item_endpoint(schedule_id)
    );

    let response = run_mutation(cache, &SCHEDULES, repo.delete(&endpoint)).await?;

    Ok(response.message)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::forms::FormError;
    use crate::repository::MutationResponse;
    use crate::repository::mock::MockWriter;
    use crate::services::ServiceError;
    use crate::services::test_support::{is_invalidated, warm_cache};

    fn form() -> AddScheduleForm {
        AddScheduleForm {
            date: "2026-05-02".into(),
            start_time: "08:00".into(),
            price: 0,
            capacity: 30,
            is_partner: true,
            partner_id: Some(2),
            package_ids: vec![5],
        }
    }

    #[tokio::test]
    async fn create_posts_normalized_body() {
        let mut repo = MockWriter::new();
        repo.expect_create()
            .withf(|endpoint, body| {
                endpoint == "/api/schedules"
                    && *body
                        == json!({
                            "date": "2026-05-02",
                            "start_time": "08:00",
                            "price": 0,
                            "capacity": 30,
                            "is_partner": true,
                            "partner_id": 2,
                            "package_ids": [5]
                        })
            })
            .times(1)
            .returning(|_, _| {
                Ok(serde_json::from_value::<MutationResponse>(json!({
                    "message": "Jadwal berhasil dibuat"
                }))
                .unwrap())
            });
        let (cache, key) = warm_cache("schedules");

        let outcome = create_schedule(&repo, &cache, form()).await.unwrap();

        assert_eq!(outcome.message.as_deref(), Some("Jadwal berhasil dibuat"));
        assert!(is_invalidated(&cache, &key));
    }

    #[tokio::test]
    async fn partner_schedule_without_packages_is_rejected_locally() {
        let mut repo = MockWriter::new();
        repo.expect_create().never();
        let (cache, key) = warm_cache("schedules");

        let form = AddScheduleForm {
            package_ids: vec![],
            ..form()
        };
        let err = create_schedule(&repo, &cache, form).await.unwrap_err();

        assert!(matches!(err, ServiceError::Form(FormError::Validation(_))));
        assert!(!is_invalidated(&cache, &key));
    }

    #[tokio::test]
    async fn participant_membership_endpoints() {
        let mut repo = MockWriter::new();
        repo.expect_create()
            .withf(|endpoint, body| {
                endpoint == "/api/schedules/3/participants" && *body == json!({"user_id": 8})
            })
            .times(1)
            .returning(|_, _| Ok(MutationResponse::default()));
        repo.expect_delete()
            .withf(|endpoint| endpoint == "/api/schedules/3/participants/8")
            .times(1)
            .returning(|_| Ok(MutationResponse::default()));
        let (cache, key) = warm_cache("schedules");
        let schedule = ScheduleId::new(3).unwrap();
        let participant = ParticipantId::new(8).unwrap();

        add_participant(&repo, &cache, schedule, participant)
            .await
            .unwrap();
        assert!(is_invalidated(&cache, &key));

        remove_participant(&repo, &cache, schedule, participant)
            .await
            .unwrap();
    }
}
