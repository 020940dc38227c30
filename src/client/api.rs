/**
 * Task API Client
 *
 * HTTP client for the task endpoints used by reconciliation. Requests carry
 * the cached JWT as a bearer token.
 */

use crate::client::config::Config;
use crate::shared::error::ApiError;
use crate::shared::task::{CachedTask, Task};
use futures_util::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

/// A task as the server returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTask {
    pub id: String,
    #[serde(flatten)]
    pub task: Task,
}

impl From<RemoteTask> for CachedTask {
    fn from(remote: RemoteTask) -> Self {
        CachedTask::from_server(remote.id, remote.task)
    }
}

/// Server-side task operations
pub trait TaskRemote: Send + Sync {
    fn fetch_tasks<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Vec<RemoteTask>, ApiError>>;

    fn create_task<'a>(&'a self, token: &'a str, task: &'a Task) -> BoxFuture<'a, Result<RemoteTask, ApiError>>;

    fn update_task<'a>(
        &'a self,
        token: &'a str,
        id: &'a str,
        task: &'a Task,
    ) -> BoxFuture<'a, Result<RemoteTask, ApiError>>;
}

/// reqwest implementation of [`TaskRemote`] against `/api/tasks`
#[derive(Debug, Clone)]
pub struct HttpTaskRemote {
    config: Config,
    client: Client,
}

impl HttpTaskRemote {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl TaskRemote for HttpTaskRemote {
    fn fetch_tasks<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Vec<RemoteTask>, ApiError>> {
        Box::pin(async move {
            let url = self.config.api_url("/api/tasks");
            let response = self.authorized(self.client.get(&url), token).send().await?;
            Self::decode(response).await
        })
    }

    fn create_task<'a>(&'a self, token: &'a str, task: &'a Task) -> BoxFuture<'a, Result<RemoteTask, ApiError>> {
        Box::pin(async move {
            let url = self.config.api_url("/api/tasks");
            let response = self
                .authorized(self.client.post(&url), token)
                .json(task)
                .send()
                .await?;
            Self::decode(response).await
        })
    }

    fn update_task<'a>(
        &'a self,
        token: &'a str,
        id: &'a str,
        task: &'a Task,
    ) -> BoxFuture<'a, Result<RemoteTask, ApiError>> {
        Box::pin(async move {
            let url = self.config.api_url(&format!("/api/tasks/{}", id));
            let response = self
                .authorized(self.client.put(&url), token)
                .json(task)
                .send()
                .await?;
            Self::decode(response).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_task_parses_server_shape() {
        let body = r#"{"id":"ckx1","title":"Revise","priority":"high","completed":false,"userId":"u1"}"#;
        let remote: RemoteTask = serde_json::from_str(body).unwrap();
        assert_eq!(remote.id, "ckx1");
        assert_eq!(remote.task.title, "Revise");

        let cached = CachedTask::from(remote);
        assert!(!cached.is_unsynced());
    }
}
