use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tpka_admin::domain::operator::Operator;
use tpka_admin::query::EffectiveParams;
use tpka_admin::repository::errors::RepositoryError;
use tpka_admin::{ListSettings, ListSnapshot, ListStatus, ListViewModel, QueryCache};

mod common;

use common::{ScriptedReader, operators, params};

fn operator_view(reader: &Arc<ScriptedReader>, cache: &QueryCache) -> ListViewModel<Operator> {
    ListViewModel::new(reader.clone(), cache.clone(), &ListSettings::default())
}

fn fetch(
    view: &ListViewModel<Operator>,
    params: EffectiveParams,
) -> JoinHandle<ListSnapshot<Operator>> {
    let orchestrator = view.orchestrator().clone();
    tokio::spawn(async move { orchestrator.fetch(params).await })
}

fn names(snapshot: &ListSnapshot<Operator>) -> Vec<&str> {
    snapshot.rows().iter().map(|row| row.name.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn search_settles_then_paging_keeps_previous_rows() {
    let reader = Arc::new(ScriptedReader::default());
    let mut view = operator_view(&reader, &QueryCache::new());
    assert_eq!(view.snapshot().status, ListStatus::Idle);

    let initial = fetch(&view, view.effective_params());
    reader.wait_for_calls(1).await;
    assert_eq!(view.snapshot().status, ListStatus::Loading);
    reader.respond_oldest(&params(1), Ok(operators(&["budi"], 1, 12)));
    initial.await.unwrap();
    assert_eq!(view.page_window(), vec![Some(1), Some(2), None, Some(12)]);

    let started = Instant::now();
    let mut settled = view.subscribe_search();
    for text in ["a", "an", "ani"] {
        view.set_free_text(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(view.effective_params().search(), None);
    }
    settled.changed().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(550));

    let search = view.effective_params();
    assert_eq!(
        search,
        EffectiveParams::new()
            .with("q", "ani")
            .with("page", "1")
            .with("per_page", "20")
    );

    let searching = fetch(&view, search.clone());
    reader.wait_for_calls(2).await;
    let snapshot = view.snapshot();
    assert_eq!(snapshot.status, ListStatus::Refetching);
    assert_eq!(names(&snapshot), vec!["budi"]);

    reader.respond_oldest(&search, Ok(operators(&["ani", "anita"], 1, 3)));
    let snapshot = searching.await.unwrap();
    assert_eq!(snapshot.status, ListStatus::Success);
    assert_eq!(view.page_window(), vec![Some(1), Some(2), Some(3)]);

    view.set_page(3);
    let page_three = view.effective_params();
    assert_eq!(page_three.page(), Some(3));
    let paging = fetch(&view, page_three.clone());
    reader.wait_for_calls(3).await;
    let snapshot = view.snapshot();
    assert_eq!(snapshot.status, ListStatus::Refetching);
    assert_eq!(snapshot.data.as_ref().unwrap().current_page, 1);

    reader.respond_oldest(&page_three, Ok(operators(&["anisa"], 3, 3)));
    let snapshot = paging.await.unwrap();
    assert_eq!(snapshot.status, ListStatus::Success);
    assert_eq!(names(&snapshot), vec!["anisa"]);
    assert_eq!(view.page_window(), vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test(start_paused = true)]
async fn late_response_for_older_page_does_not_replace_newer_page() {
    let reader = Arc::new(ScriptedReader::default());
    let view = operator_view(&reader, &QueryCache::new());

    let first = fetch(&view, params(1));
    reader.wait_for_calls(1).await;
    let second = fetch(&view, params(2));
    reader.wait_for_calls(2).await;

    reader.respond_oldest(&params(2), Ok(operators(&["page-two"], 2, 2)));
    second.await.unwrap();
    reader.respond_oldest(&params(1), Ok(operators(&["page-one"], 1, 2)));
    first.await.unwrap();

    let snapshot = view.snapshot();
    assert_eq!(snapshot.status, ListStatus::Success);
    assert_eq!(names(&snapshot), vec!["page-two"]);

    // The late page was still cached under its own key.
    let snapshot = view.orchestrator().fetch(params(1)).await;
    assert_eq!(names(&snapshot), vec!["page-one"]);
    assert_eq!(reader.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn superseded_response_for_same_params_is_discarded() {
    let reader = Arc::new(ScriptedReader::default());
    let view = operator_view(&reader, &QueryCache::new());

    let older = fetch(&view, params(1));
    reader.wait_for_calls(1).await;
    let newer = fetch(&view, params(1));
    reader.wait_for_calls(2).await;

    reader.respond_newest(&params(1), Ok(operators(&["fresh"], 1, 1)));
    newer.await.unwrap();
    reader.respond_oldest(&params(1), Ok(operators(&["outdated"], 1, 1)));
    older.await.unwrap();

    assert_eq!(names(&view.snapshot()), vec!["fresh"]);
    let snapshot = view.orchestrator().fetch(params(1)).await;
    assert_eq!(names(&snapshot), vec!["fresh"]);
    assert_eq!(reader.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn views_sharing_a_cache_reuse_fresh_pages() {
    let reader = Arc::new(ScriptedReader::default());
    let cache = QueryCache::new();
    let table = operator_view(&reader, &cache);
    let export = operator_view(&reader, &cache);

    let loading = fetch(&table, params(1));
    reader.wait_for_calls(1).await;
    reader.respond_oldest(&params(1), Ok(operators(&["ani"], 1, 1)));
    loading.await.unwrap();

    let snapshot = export.orchestrator().fetch(params(1)).await;

    assert_eq!(snapshot.status, ListStatus::Success);
    assert_eq!(names(&snapshot), vec!["ani"]);
    assert_eq!(reader.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn views_requesting_the_same_page_together_both_settle() {
    let reader = Arc::new(ScriptedReader::default());
    let cache = QueryCache::new();
    let table = operator_view(&reader, &cache);
    let export = operator_view(&reader, &cache);

    let table_load = fetch(&table, params(1));
    reader.wait_for_calls(1).await;
    let export_load = fetch(&export, params(1));
    reader.wait_for_calls(2).await;

    reader.respond_oldest(&params(1), Ok(operators(&["older"], 1, 1)));
    reader.respond_oldest(&params(1), Ok(operators(&["newer"], 1, 1)));
    let table_snapshot = table_load.await.unwrap();
    let export_snapshot = export_load.await.unwrap();

    assert_eq!(table_snapshot.status, ListStatus::Success);
    assert_eq!(names(&table_snapshot), vec!["newer"]);
    assert_eq!(export_snapshot.status, ListStatus::Success);
    assert_eq!(names(&export_snapshot), vec!["newer"]);
    assert_eq!(table.snapshot().status, ListStatus::Success);
    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_shared_request_adopts_the_newer_result() {
    let reader = Arc::new(ScriptedReader::default());
    let cache = QueryCache::new();
    let table = operator_view(&reader, &cache);
    let export = operator_view(&reader, &cache);

    let table_load = fetch(&table, params(1));
    reader.wait_for_calls(1).await;
    let export_load = fetch(&export, params(1));
    reader.wait_for_calls(2).await;

    reader.respond_oldest(&params(1), Err(RepositoryError::Transport("timeout".into())));
    tokio::task::yield_now().await;
    assert_eq!(table.snapshot().status, ListStatus::Loading);

    reader.respond_oldest(&params(1), Ok(operators(&["ani"], 1, 1)));
    let snapshot = table_load.await.unwrap();
    assert_eq!(snapshot.status, ListStatus::Success);
    assert_eq!(snapshot.error, None);
    assert_eq!(names(&snapshot), vec!["ani"]);
    assert_eq!(export_load.await.unwrap().status, ListStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn newer_shared_failure_reaches_both_views() {
    let reader = Arc::new(ScriptedReader::default());
    let cache = QueryCache::new();
    let table = operator_view(&reader, &cache);
    let export = operator_view(&reader, &cache);

    let table_load = fetch(&table, params(1));
    reader.wait_for_calls(1).await;
    let export_load = fetch(&export, params(1));
    reader.wait_for_calls(2).await;

    reader.respond_oldest(&params(1), Ok(operators(&["ani"], 1, 1)));
    reader.respond_oldest(
        &params(1),
        Err(RepositoryError::Server {
            status: 503,
            message: "Maintenance in progress".into(),
        }),
    );

    for snapshot in [table_load.await.unwrap(), export_load.await.unwrap()] {
        assert_eq!(snapshot.status, ListStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some("Maintenance in progress"));
    }
}

#[tokio::test(start_paused = true)]
async fn mutation_invalidates_every_page_of_the_resource() {
    let reader = Arc::new(ScriptedReader::default());
    let view = operator_view(&reader, &QueryCache::new());

    for page in [1, 2] {
        let loading = fetch(&view, params(page));
        reader.wait_for_calls(page).await;
        reader.respond_oldest(&params(page), Ok(operators(&["before"], page, 2)));
        loading.await.unwrap();
    }

    let orchestrator = view.orchestrator().clone();
    let mutation = tokio::spawn(async move {
        orchestrator
            .mutate(async { Ok::<_, RepositoryError>("saved") })
            .await
    });
    reader.wait_for_calls(3).await;
    assert_eq!(reader.calls()[2], params(2));
    reader.respond_oldest(&params(2), Ok(operators(&["after"], 2, 2)));
    assert_eq!(mutation.await.unwrap(), Ok("saved"));
    assert_eq!(names(&view.snapshot()), vec!["after"]);

    // Page 1 was not on screen but is stale too.
    let back = fetch(&view, params(1));
    reader.wait_for_calls(4).await;
    let snapshot = view.snapshot();
    assert_eq!(snapshot.status, ListStatus::Refetching);
    assert_eq!(names(&snapshot), vec!["before"]);
    reader.respond_oldest(&params(1), Ok(operators(&["after"], 1, 2)));
    assert_eq!(back.await.unwrap().status, ListStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn failed_refetch_keeps_rows_until_recovery() {
    let reader = Arc::new(ScriptedReader::default());
    let view = operator_view(&reader, &QueryCache::new());

    let loading = fetch(&view, params(1));
    reader.wait_for_calls(1).await;
    reader.respond_oldest(&params(1), Ok(operators(&["ani"], 1, 2)));
    loading.await.unwrap();

    let failing = fetch(&view, params(2));
    reader.wait_for_calls(2).await;
    reader.respond_oldest(
        &params(2),
        Err(RepositoryError::Server {
            status: 500,
            message: "Database unavailable".into(),
        }),
    );
    let snapshot = failing.await.unwrap();
    assert_eq!(snapshot.status, ListStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some("Database unavailable"));
    assert_eq!(names(&snapshot), vec!["ani"]);

    let retry = fetch(&view, params(2));
    reader.wait_for_calls(3).await;
    assert_eq!(view.snapshot().status, ListStatus::Refetching);
    reader.respond_oldest(&params(2), Ok(operators(&["budi"], 2, 2)));
    let snapshot = retry.await.unwrap();
    assert_eq!(snapshot.status, ListStatus::Success);
    assert_eq!(snapshot.error, None);
    assert_eq!(names(&snapshot), vec!["budi"]);
}

#[tokio::test(start_paused = true)]
async fn disposed_view_ignores_in_flight_response() {
    let reader = Arc::new(ScriptedReader::default());
    let cache = QueryCache::new();
    let mut view = operator_view(&reader, &cache);

    let loading = fetch(&view, params(1));
    reader.wait_for_calls(1).await;
    view.dispose();
    reader.respond_oldest(&params(1), Ok(operators(&["ani"], 1, 1)));
    loading.await.unwrap();

    assert!(view.snapshot().data.is_none());
    assert_eq!(cache.len(), 1);
}
