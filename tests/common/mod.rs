use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::oneshot;
use tpka_admin::pagination::PaginatedResult;
use tpka_admin::query::EffectiveParams;
use tpka_admin::repository::errors::{RepositoryError, RepositoryResult};
use tpka_admin::repository::{ResourceReader, RowPage};

type Reply = oneshot::Sender<RepositoryResult<RowPage>>;

/// Reader whose responses are released by the test, in any order.
#[derive(Default)]
pub struct ScriptedReader {
    state: Mutex<Script>,
}

#[derive(Default)]
struct Script {
    calls: Vec<EffectiveParams>,
    waiting: HashMap<EffectiveParams, VecDeque<Reply>>,
}

#[async_trait]
impl ResourceReader for ScriptedReader {
    async fn list(&self, _endpoint: &str, params: &EffectiveParams) -> RepositoryResult<RowPage> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(params.clone());
            state.waiting.entry(params.clone()).or_default().push_back(tx);
        }
        rx.await
            .unwrap_or_else(|_| Err(RepositoryError::Transport("reply dropped".into())))
    }
}

impl ScriptedReader {
    pub fn calls(&self) -> Vec<EffectiveParams> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Yields until `count` requests have been issued.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls().len() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Answers the oldest pending request for `params`.
    pub fn respond_oldest(&self, params: &EffectiveParams, result: RepositoryResult<RowPage>) {
        let reply = self
            .state
            .lock()
            .unwrap()
            .waiting
            .get_mut(params)
            .and_then(VecDeque::pop_front)
            .expect("no pending request for params");
        let _ = reply.send(result);
    }

    /// Answers the newest pending request for `params`.
    pub fn respond_newest(&self, params: &EffectiveParams, result: RepositoryResult<RowPage>) {
        let reply = self
            .state
            .lock()
            .unwrap()
            .waiting
            .get_mut(params)
            .and_then(VecDeque::pop_back)
            .expect("no pending request for params");
        let _ = reply.send(result);
    }
}

pub fn params(page: usize) -> EffectiveParams {
    EffectiveParams::new()
        .with("page", page.to_string())
        .with("per_page", "20")
}

/// Operator rows named `names`, reported as `current_page` of `last_page`.
pub fn operators(names: &[&str], current_page: usize, last_page: usize) -> RowPage {
    PaginatedResult {
        data: names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "id": (current_page - 1) * 20 + i + 1,
                    "name": name,
                    "email": format!("{name}@tpka.id"),
                    "is_active": true
                })
            })
            .collect(),
        current_page,
        last_page,
        per_page: 20,
        total: last_page * 20,
        from: Some((current_page - 1) * 20 + 1),
        to: Some((current_page - 1) * 20 + names.len()),
    }
}
