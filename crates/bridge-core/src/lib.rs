pub mod backend;
pub mod errors;
pub mod events;
pub mod ids;
pub mod outcome;
pub mod params;

pub use backend::{AddTaskRequest, Backend, EventStream, ImproveRequest};
pub use errors::TransportError;
pub use events::{
    AskPayload, Dispatch, ListFilesArgs, ProtocolEvent, ReadFileArgs, RunCommandArgs,
    SearchReplaceArgs, Step, ToolOp, ToolRequest, WriteFileArgs,
};
pub use ids::{AgentName, ProjectId, RequestId, TaskId};
pub use outcome::ToolOutcome;
pub use params::{ChatParams, ParamsBuilder, ParamsError};
