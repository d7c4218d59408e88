use serde::Serialize;
use serde_json::Value;

use bridge_core::{ProtocolEvent, Step, TaskId};

/// Notifications delivered to the external observer sink (UI/log).
/// Every backend event is forwarded verbatim before any local handling,
/// including events the core also acts upon and synthesized errors.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObserverEvent {
    Event { step: Step, data: Value },
    Completed { task_id: TaskId },
    Aborted,
}

impl ObserverEvent {
    pub fn from_protocol(event: &ProtocolEvent) -> Self {
        Self::Event {
            step: event.step,
            data: event.data.clone(),
        }
    }
}
