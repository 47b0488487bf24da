use reqwest::{Client, Response};

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::models::{NewTask, Task, TaskId, TaskPatch, TaskRecord};

// clones share one connection pool
#[derive(Debug, Clone)]
pub struct TaskApi {
    client: Client,
    base_url: String,
}

impl TaskApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn task_url(&self, id: &TaskId) -> String {
        format!("{}/{}", self.base_url, id.as_str())
    }

    /// Fetches every task, in no particular order. Records that cannot be
    /// read are logged and skipped.
    pub async fn list(&self) -> Result<Vec<Task>> {
        let response = self.client.get(&self.base_url).send().await?;
        let response = check_status(response, "GET").await?;
        let body = response.bytes().await?;
        let records: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
        let total = records.len();

        let tasks: Vec<Task> = records
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<TaskRecord>(value.clone()) {
                Ok(record) => Some(record.into()),
                Err(err) => {
                    log::warn!("skipping unreadable task record {value}: {err}");
                    None
                }
            })
            .collect();
        log::info!("fetched {} of {} tasks from {}", tasks.len(), total, self.base_url);
        Ok(tasks)
    }

    pub async fn create(&self, new_task: &NewTask) -> Result<Task> {
        let response = self
            .client
            .post(&self.base_url)
            .json(new_task)
            .send()
            .await?;
        let response = check_status(response, "POST").await?;
        let body = response.bytes().await?;
        let record: TaskRecord = serde_json::from_slice(&body)?;
        log::info!("created task {} at position {}", record.id, record.position);
        Ok(record.into())
    }

    // the store merges present fields and echoes the record, which is ignored
    pub async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<()> {
        let response = self
            .client
            .put(self.task_url(id))
            .json(patch)
            .send()
            .await?;
        check_status(response, "PUT").await?;
        Ok(())
    }

    pub async fn delete(&self, id: &TaskId) -> Result<()> {
        let response = self.client.delete(self.task_url(id)).send().await?;
        check_status(response, "DELETE").await?;
        Ok(())
    }
}

async fn check_status(response: Response, method: &'static str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(TaskError::Status {
        method,
        url,
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> TaskApi {
        let config = Config::new(&format!("{}/todos", server.uri()), 5, "info", None).unwrap();
        TaskApi::new(&config).unwrap()
    }

    #[tokio::test]
    async fn list_decodes_wire_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "2", "name": "b", "completed": true, "isProcessing": false,
                 "position": 1, "createdAt": "2024-10-06T12:00:00.000Z"},
                {"id": "1", "name": "a", "completed": false, "isProcessing": true,
                 "position": 0, "createdAt": "2024-10-06T11:00:00.000Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let tasks = api_for(&server).list().await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, TaskId::new("2"));
        assert_eq!(tasks[0].status, Status::Completed);
        assert_eq!(tasks[1].status, Status::InProgress);
    }

    #[tokio::test]
    async fn list_skips_unreadable_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "1", "name": "a", "position": 0,
                 "createdAt": "2024-10-06T11:00:00.000Z"},
                {"id": "2", "name": "no timestamp", "position": 1},
                {"id": "3", "name": "bad position", "position": -1,
                 "createdAt": "2024-10-06T11:00:00.000Z"}
            ])))
            .mount(&server)
            .await;

        let tasks = api_for(&server).list().await.unwrap();

        let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(tasks[1].name, "no timestamp");
    }

    #[tokio::test]
    async fn create_posts_new_task_and_returns_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .and(body_partial_json(json!({
                "name": "Buy milk",
                "completed": false,
                "isProcessing": false,
                "position": 3
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "42", "name": "Buy milk", "completed": false, "isProcessing": false,
                "position": 3, "createdAt": "2024-10-06T12:00:00.000Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let task = api_for(&server)
            .create(&NewTask::new("Buy milk", 3))
            .await
            .unwrap();

        assert_eq!(task.id, TaskId::new("42"));
        assert_eq!(task.position, 3);
        assert_eq!(task.status, Status::ToDo);
    }

    #[tokio::test]
    async fn update_puts_only_patched_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/todos/9"))
            .and(body_json(json!({"position": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        api_for(&server)
            .update(&TaskId::new("9"), &TaskPatch::position(4))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/todos/5"))
            .respond_with(ResponseTemplate::new(404).set_body_string("\"Not found\""))
            .mount(&server)
            .await;

        let err = api_for(&server).delete(&TaskId::new("5")).await.unwrap_err();

        match err {
            TaskError::Status { method, status, body, .. } => {
                assert_eq!(method, "DELETE");
                assert_eq!(status, 404);
                assert!(body.contains("Not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_list_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = api_for(&server).list().await.unwrap_err();
        assert!(matches!(err, TaskError::Decode(_)));
    }
}
