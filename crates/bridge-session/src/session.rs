use bridge_core::{ProjectId, TaskId};

/// Local state for one in-progress remote task. Created at task start,
/// cleared on every terminal path; held in a slot rather than as loose
/// instance fields so the identifiers vanish together.
#[derive(Clone, Debug)]
pub struct Session {
    pub project_id: ProjectId,
    pub task_id: TaskId,
}

impl Session {
    pub fn new(project_id: ProjectId, task_id: TaskId) -> Self {
        Self {
            project_id,
            task_id,
        }
    }
}

/// Terminal state of one task start. Exactly one is reached per
/// `start_task` call, after which the orchestrator is idle again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Aborted,
    Errored,
}
