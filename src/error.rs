use crate::models::TaskId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskError>;

#[derive(Debug, Error)]
pub enum TaskError {
    // connection refused, timeout, TLS
    #[error("request to task store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("task store returned {status} for {method} {url}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("malformed task store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("task not found: {id}")]
    TaskNotFound { id: TaskId },

    #[error("unknown container '{name}' (expected list, to-do, in-progress or completed)")]
    InvalidContainer { name: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TaskError {
    pub fn not_found(id: &TaskId) -> Self {
        TaskError::TaskNotFound { id: id.clone() }
    }
}
