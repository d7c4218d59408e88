use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ids::{ProjectId, TaskId};

/// Immutable request descriptor for starting a session. Built once per task
/// start by a [`ParamsBuilder`] and serialized as the `/chat` body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatParams {
    pub task_id: TaskId,
    pub project_id: ProjectId,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Retry budget owned by the backend; the client never retries.
    pub max_retries: u32,
    pub enable_local_system: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installed_tools: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("missing configuration: {0}")]
    MissingConfig(String),
}

/// Collaborator that assembles [`ChatParams`] from ambient configuration
/// (model, credentials, capability set). The orchestrator only supplies the
/// question and attachments.
#[async_trait]
pub trait ParamsBuilder: Send + Sync {
    async fn build(&self, question: &str, images: Vec<String>) -> Result<ChatParams, ParamsError>;
}
