use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{AgentName, RequestId};

/// Lifecycle/tool-delegation step kinds emitted by the backend.
/// Frames carrying a step outside this set fail to decode and are dropped
/// at the framing layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    // Lifecycle markers
    Confirmed,
    ToSubTasks,
    CreateAgent,
    AssignTask,
    ActivateAgent,
    DeactivateAgent,
    TaskState,
    NewTaskState,
    Notice,
    SearchMcp,
    DecomposeText,
    DecomposeProgress,
    AddTask,
    RemoveTask,
    // Terminal markers
    End,
    Error,
    Timeout,
    // Human input
    Ask,
    // Delegated execution
    ExecuteFileWrite,
    ExecuteReadFile,
    ExecuteSearchReplace,
    ExecuteListFiles,
    ExecuteTerminal,
    // Legacy one-way notices
    WriteFile,
    Terminal,
}

impl Step {
    /// Terminal markers stop stream consumption after the event is handled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Error | Self::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::ToSubTasks => "to_sub_tasks",
            Self::CreateAgent => "create_agent",
            Self::AssignTask => "assign_task",
            Self::ActivateAgent => "activate_agent",
            Self::DeactivateAgent => "deactivate_agent",
            Self::TaskState => "task_state",
            Self::NewTaskState => "new_task_state",
            Self::Notice => "notice",
            Self::SearchMcp => "search_mcp",
            Self::DecomposeText => "decompose_text",
            Self::DecomposeProgress => "decompose_progress",
            Self::AddTask => "add_task",
            Self::RemoveTask => "remove_task",
            Self::End => "end",
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::Ask => "ask",
            Self::ExecuteFileWrite => "execute_file_write",
            Self::ExecuteReadFile => "execute_read_file",
            Self::ExecuteSearchReplace => "execute_search_replace",
            Self::ExecuteListFiles => "execute_list_files",
            Self::ExecuteTerminal => "execute_terminal",
            Self::WriteFile => "write_file",
            Self::Terminal => "terminal",
        }
    }
}

/// One decoded frame of the event stream. Immutable once produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolEvent {
    pub step: Step,
    #[serde(default)]
    pub data: Value,
}

impl ProtocolEvent {
    pub fn new(step: Step, data: Value) -> Self {
        Self { step, data }
    }

    /// Synthesized error event carrying a local failure message.
    pub fn synthetic_error(message: impl Into<String>) -> Self {
        Self {
            step: Step::Error,
            data: serde_json::json!({ "message": message.into() }),
        }
    }

    /// Classify this event for dispatch. All payload field access goes
    /// through serde here; a malformed payload degrades to `Notice` so the
    /// dispatch loop drops it without side effects.
    pub fn dispatch(&self) -> Dispatch {
        if self.step.is_terminal() {
            return Dispatch::Terminal(self.step);
        }
        match self.step {
            Step::Ask => match serde_json::from_value::<AskPayload>(self.data.clone()) {
                Ok(payload) => Dispatch::Ask(payload),
                Err(_) => Dispatch::Notice,
            },
            Step::ExecuteFileWrite
            | Step::ExecuteReadFile
            | Step::ExecuteSearchReplace
            | Step::ExecuteListFiles
            | Step::ExecuteTerminal => match ToolRequest::from_event(self.step, &self.data) {
                Some(req) => Dispatch::Tool(req),
                None => Dispatch::Notice,
            },
            _ => Dispatch::Notice,
        }
    }
}

/// Typed view of an event from the dispatch loop's perspective.
#[derive(Clone, Debug)]
pub enum Dispatch {
    Ask(AskPayload),
    Tool(ToolRequest),
    Terminal(Step),
    Notice,
}

/// Payload of an `ask` event.
#[derive(Clone, Debug, Deserialize)]
pub struct AskPayload {
    pub agent: AgentName,
    #[serde(default)]
    pub request_id: Option<RequestId>,
}

/// A delegated tool call: correlation id plus the typed operation.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolRequest {
    pub request_id: RequestId,
    pub op: ToolOp,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawRequestId {
    Text(String),
    Number(i64),
}

#[derive(Deserialize)]
struct RawToolPayload {
    request_id: Option<RawRequestId>,
    #[serde(flatten)]
    rest: Value,
}

impl ToolRequest {
    /// Extract a typed request from a delegated-execution event payload.
    /// Returns `None` when the payload lacks a usable `request_id` or the
    /// operation fields do not deserialize.
    pub fn from_event(step: Step, data: &Value) -> Option<Self> {
        let raw: RawToolPayload = serde_json::from_value(data.clone()).ok()?;
        let request_id = match raw.request_id? {
            RawRequestId::Text(s) if !s.is_empty() => RequestId::from_raw(s),
            RawRequestId::Text(_) => return None,
            RawRequestId::Number(n) => RequestId::from_raw(n.to_string()),
        };
        let op = match step {
            Step::ExecuteFileWrite => ToolOp::WriteFile(serde_json::from_value(raw.rest).ok()?),
            Step::ExecuteReadFile => ToolOp::ReadFile(serde_json::from_value(raw.rest).ok()?),
            Step::ExecuteSearchReplace => {
                ToolOp::SearchReplace(serde_json::from_value(raw.rest).ok()?)
            }
            Step::ExecuteListFiles => ToolOp::ListFiles(serde_json::from_value(raw.rest).ok()?),
            Step::ExecuteTerminal => ToolOp::RunCommand(serde_json::from_value(raw.rest).ok()?),
            _ => return None,
        };
        Some(Self { request_id, op })
    }

    /// Wire name reported back with the tool result.
    pub fn tool_name(&self) -> &'static str {
        match self.op {
            ToolOp::WriteFile(_) => Step::ExecuteFileWrite.as_str(),
            ToolOp::ReadFile(_) => Step::ExecuteReadFile.as_str(),
            ToolOp::SearchReplace(_) => Step::ExecuteSearchReplace.as_str(),
            ToolOp::ListFiles(_) => Step::ExecuteListFiles.as_str(),
            ToolOp::RunCommand(_) => Step::ExecuteTerminal.as_str(),
        }
    }
}

/// The concrete local operations a backend may delegate.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolOp {
    WriteFile(WriteFileArgs),
    ReadFile(ReadFileArgs),
    SearchReplace(SearchReplaceArgs),
    ListFiles(ListFilesArgs),
    RunCommand(RunCommandArgs),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WriteFileArgs {
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SearchReplaceArgs {
    pub path: String,
    pub old_string: String,
    #[serde(default)]
    pub new_string: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ListFilesArgs {
    pub pattern: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RunCommandArgs {
    pub command: String,
    #[serde(default)]
    pub cwd: Option<String>,
}
