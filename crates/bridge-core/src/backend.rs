use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;
use crate::events::ProtocolEvent;
use crate::ids::{AgentName, ProjectId, RequestId, TaskId};
use crate::outcome::ToolOutcome;
use crate::params::ChatParams;

/// Ordered event sequence produced by one session. Lazily produced and
/// single-consumer; a fresh call to `start_session` yields a fresh stream
/// (restartable per call, not resumable mid-stream).
pub type EventStream = Pin<Box<dyn Stream<Item = Result<ProtocolEvent, TransportError>> + Send>>;

/// Body of the add-task control call. Optional fields are omitted when unset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AddTaskRequest {
    pub content: String,
    pub project_id: ProjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_independent: Option<bool>,
}

/// Body of the improve/follow-up control call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImproveRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attaches: Option<Vec<String>>,
}

/// The Stream Client surface the orchestrator drives. One outbound
/// streaming request plus fire-and-forget control calls against the same
/// session base path. Control calls carry no retry logic.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Open the event stream for one task session.
    async fn start_session(&self, params: &ChatParams) -> Result<EventStream, TransportError>;

    /// Stop the remote session. 2xx or no-content responses are accepted.
    async fn stop_session(&self, project: &ProjectId) -> Result<(), TransportError>;

    /// Report the human's answer to an `ask` event. Must be invoked at most
    /// once per originating event.
    async fn send_human_reply(
        &self,
        project: &ProjectId,
        agent: &AgentName,
        reply: &str,
    ) -> Result<(), TransportError>;

    /// Report one delegated execution result, correlated by request id.
    /// Must be invoked at most once per originating event.
    async fn send_tool_result(
        &self,
        project: &ProjectId,
        request_id: &RequestId,
        tool_name: &str,
        outcome: &ToolOutcome,
    ) -> Result<(), TransportError>;

    async fn add_task(
        &self,
        project: &ProjectId,
        request: &AddTaskRequest,
    ) -> Result<(), TransportError>;

    async fn remove_task(&self, project: &ProjectId, task: &TaskId) -> Result<(), TransportError>;

    async fn skip_task(&self, project: &ProjectId) -> Result<(), TransportError>;

    async fn improve(
        &self,
        project: &ProjectId,
        request: &ImproveRequest,
    ) -> Result<(), TransportError>;
}
