use std::collections::HashMap;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::api::TaskApi;
use crate::models::{TaskId, TaskPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEffect {
    Update { id: TaskId, patch: TaskPatch },
    Delete { id: TaskId },
}

impl RemoteEffect {
    pub fn task_id(&self) -> &TaskId {
        match self {
            RemoteEffect::Update { id, .. } | RemoteEffect::Delete { id } => id,
        }
    }
}

/// Effects for the same task run one after another in dispatch order.
/// Failures are logged and never rolled back into local state.
pub struct Dispatcher {
    api: TaskApi,
    runtime: Handle,
    lanes: HashMap<TaskId, JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(api: TaskApi, runtime: Handle) -> Self {
        Self {
            api,
            runtime,
            lanes: HashMap::new(),
        }
    }

    pub fn dispatch(&mut self, effects: Vec<RemoteEffect>) {
        self.lanes.retain(|_, handle| !handle.is_finished());

        for effect in effects {
            let id = effect.task_id().clone();
            let previous = self.lanes.remove(&id);
            let api = self.api.clone();
            let handle = self.runtime.spawn(async move {
                if let Some(previous) = previous {
                    // the previous effect logs its own failure
                    let _ = previous.await;
                }
                run_effect(&api, effect).await;
            });
            self.lanes.insert(id, handle);
        }
    }

    pub fn pending(&self) -> usize {
        self.lanes.values().filter(|handle| !handle.is_finished()).count()
    }

    pub async fn settle(&mut self) {
        for (_, handle) in self.lanes.drain() {
            let _ = handle.await;
        }
    }
}

async fn run_effect(api: &TaskApi, effect: RemoteEffect) {
    let result = match &effect {
        RemoteEffect::Update { id, patch } => {
            log::debug!("updating task {id}: {patch:?}");
            api.update(id, patch).await
        }
        RemoteEffect::Delete { id } => {
            log::debug!("deleting task {id}");
            api.delete(id).await
        }
    };

    if let Err(err) = result {
        log::error!("remote effect failed for task {}: {err}", effect.task_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher_for(server: &MockServer) -> Dispatcher {
        let config = Config::new(&format!("{}/todos", server.uri()), 5, "info", None).unwrap();
        Dispatcher::new(TaskApi::new(&config).unwrap(), Handle::current())
    }

    #[tokio::test]
    async fn dispatches_updates_and_deletes() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/todos/1"))
            .and(body_json(json!({"position": 2})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/todos/2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut dispatcher = dispatcher_for(&server);
        dispatcher.dispatch(vec![
            RemoteEffect::Update {
                id: TaskId::new("1"),
                patch: TaskPatch::position(2),
            },
            RemoteEffect::Delete { id: TaskId::new("2") },
        ]);
        dispatcher.settle().await;

        assert_eq!(dispatcher.pending(), 0);
        server.verify().await;
    }

    #[tokio::test]
    async fn effects_for_one_task_arrive_in_dispatch_order() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/todos/7"))
            .and(body_json(json!({"position": 1})))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/todos/7"))
            .and(body_json(json!({"position": 2})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut dispatcher = dispatcher_for(&server);
        dispatcher.dispatch(vec![RemoteEffect::Update {
            id: TaskId::new("7"),
            patch: TaskPatch::position(1),
        }]);
        dispatcher.dispatch(vec![RemoteEffect::Update {
            id: TaskId::new("7"),
            patch: TaskPatch::position(2),
        }]);
        dispatcher.settle().await;

        let requests = server.received_requests().await.unwrap();
        let positions: Vec<serde_json::Value> = requests
            .iter()
            .map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).unwrap()["position"].clone())
            .collect();
        assert_eq!(positions, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let mut dispatcher = dispatcher_for(&server);
        dispatcher.dispatch(vec![
            RemoteEffect::Update {
                id: TaskId::new("1"),
                patch: TaskPatch::name("first"),
            },
            RemoteEffect::Update {
                id: TaskId::new("1"),
                patch: TaskPatch::name("second"),
            },
        ]);
        dispatcher.settle().await;

        server.verify().await;
    }
}
