use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use tracing::instrument;

use bridge_core::{
    AddTaskRequest, AgentName, Backend, ChatParams, EventStream, ImproveRequest, ProjectId,
    RequestId, TaskId, ToolOutcome, TransportError,
};

use crate::config::BackendConfig;
use crate::stream::SessionStream;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the wire protocol: one streaming request per session plus
/// fire-and-forget control calls against the same session base path.
pub struct StreamClient {
    http: Client,
    config: BackendConfig,
}

impl StreamClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    /// Fail unless the response is successful. No-content responses count
    /// as success for control calls.
    async fn check_status(resp: Response) -> Result<(), TransportError> {
        let status = resp.status();
        if status.is_success() || status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(TransportError::from_status(status.as_u16(), body))
    }

    async fn send(&self, req: RequestBuilder) -> Result<(), TransportError> {
        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::check_status(resp).await
    }
}

#[async_trait]
impl Backend for StreamClient {
    #[instrument(skip(self, params), fields(project = %params.project_id, task = %params.task_id))]
    async fn start_session(&self, params: &ChatParams) -> Result<EventStream, TransportError> {
        let resp = self
            .authorize(self.http.post(self.url("/chat")))
            .json(params)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::from_status(status, body));
        }

        let stream: EventStream = Box::pin(SessionStream::new(resp.bytes_stream()));
        Ok(stream)
    }

    async fn stop_session(&self, project: &ProjectId) -> Result<(), TransportError> {
        let url = self.url(&format!("/chat/{project}"));
        self.send(self.authorize(self.http.delete(url))).await
    }

    async fn send_human_reply(
        &self,
        project: &ProjectId,
        agent: &AgentName,
        reply: &str,
    ) -> Result<(), TransportError> {
        let url = self.url(&format!("/chat/{project}/human-reply"));
        let body = serde_json::json!({ "agent": agent, "reply": reply });
        self.send(self.authorize(self.http.post(url)).json(&body))
            .await
    }

    async fn send_tool_result(
        &self,
        project: &ProjectId,
        request_id: &RequestId,
        tool_name: &str,
        outcome: &ToolOutcome,
    ) -> Result<(), TransportError> {
        let url = self.url(&format!("/chat/{project}/tool-result"));
        let body = serde_json::json!({
            "request_id": request_id,
            "tool_name": tool_name,
            "result": outcome,
        });
        self.send(self.authorize(self.http.post(url)).json(&body))
            .await
    }

    async fn add_task(
        &self,
        project: &ProjectId,
        request: &AddTaskRequest,
    ) -> Result<(), TransportError> {
        let url = self.url(&format!("/chat/{project}/add-task"));
        self.send(self.authorize(self.http.post(url)).json(request))
            .await
    }

    async fn remove_task(&self, project: &ProjectId, task: &TaskId) -> Result<(), TransportError> {
        let url = self.url(&format!("/chat/{project}/remove-task/{task}"));
        self.send(self.authorize(self.http.delete(url))).await
    }

    async fn skip_task(&self, project: &ProjectId) -> Result<(), TransportError> {
        let url = self.url(&format!("/chat/{project}/skip-task"));
        self.send(self.authorize(self.http.post(url))).await
    }

    async fn improve(
        &self,
        project: &ProjectId,
        request: &ImproveRequest,
    ) -> Result<(), TransportError> {
        let url = self.url(&format!("/chat/{project}"));
        self.send(self.authorize(self.http.post(url)).json(request))
            .await
    }
}
