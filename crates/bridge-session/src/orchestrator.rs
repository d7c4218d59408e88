use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use bridge_core::{
    AgentName, Backend, Dispatch, EventStream, ParamsBuilder, ProtocolEvent,
};
use bridge_tools::ToolExecutor;

use crate::observer::ObserverEvent;
use crate::session::{Session, TaskOutcome};

/// Correlates one outstanding `ask` event to exactly one future reply.
/// Single slot: the dispatch loop is itself the waiter, so a second `ask`
/// cannot arrive while one is pending; registering over a stale entry
/// drops its sender, resolving the stale receiver instead of leaving it
/// hanging.
struct PendingReply {
    agent: AgentName,
    tx: oneshot::Sender<String>,
}

enum LoopEnd {
    Exhausted,
    AbortedEarly,
}

/// Owns one task session's lifecycle: consumes the event sequence from the
/// stream client, drives the dispatch state machine, delegates tool
/// requests to the executor and brokers human-reply synchronization.
///
/// State machine: `Idle -> Running -> {Completed, Aborted, Errored}`,
/// returning to `Idle` after every terminal state. Exactly one session is
/// active at a time; the consumption loop is cooperative and
/// single-threaded, so delegated tool executions never overlap.
pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    tools: Arc<ToolExecutor>,
    params: Arc<dyn ParamsBuilder>,
    observer_tx: broadcast::Sender<ObserverEvent>,
    session: Mutex<Option<Session>>,
    pending_reply: Mutex<Option<PendingReply>>,
    abort: Mutex<CancellationToken>,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn Backend>,
        tools: Arc<ToolExecutor>,
        params: Arc<dyn ParamsBuilder>,
        observer_tx: broadcast::Sender<ObserverEvent>,
    ) -> Self {
        Self {
            backend,
            tools,
            params,
            observer_tx,
            session: Mutex::new(None),
            pending_reply: Mutex::new(None),
            abort: Mutex::new(CancellationToken::new()),
        }
    }

    /// Run one task to a terminal state. Failures are reported through the
    /// observer sink (as a synthesized error event) rather than returned;
    /// the returned outcome tells the caller which terminal state was
    /// reached.
    #[instrument(skip(self, question, images))]
    pub async fn start_task(&self, question: &str, images: Vec<String>) -> TaskOutcome {
        // Fresh cancellation token per task: resets the aborted flag.
        let cancel = CancellationToken::new();
        *self.abort.lock().unwrap() = cancel.clone();

        let params = match self.params.build(question, images).await {
            Ok(p) => p,
            Err(e) => return self.finish_failed(&cancel, format!("failed to build request: {e}")),
        };

        let stream = match self.backend.start_session(&params).await {
            Ok(s) => s,
            Err(e) => return self.finish_failed(&cancel, format!("failed to open stream: {e}")),
        };

        let task_id = params.task_id.clone();
        *self.session.lock().unwrap() =
            Some(Session::new(params.project_id.clone(), task_id.clone()));
        info!(project = %params.project_id, task = %task_id, "session started");

        let outcome = match self.consume(stream, &cancel).await {
            Ok(LoopEnd::Exhausted) if !cancel.is_cancelled() => {
                let _ = self.observer_tx.send(ObserverEvent::Completed {
                    task_id: task_id.clone(),
                });
                TaskOutcome::Completed
            }
            Ok(_) => TaskOutcome::Aborted,
            Err(e) => {
                if cancel.is_cancelled() {
                    // Abort is an expected termination, not an error.
                    TaskOutcome::Aborted
                } else {
                    self.forward(&ProtocolEvent::synthetic_error(e.to_string()));
                    TaskOutcome::Errored
                }
            }
        };

        self.session.lock().unwrap().take();
        info!(task = %task_id, outcome = ?outcome, "session finished");
        outcome
    }

    /// The dispatch loop. Transport and control-call failures propagate to
    /// the caller's top-level failure handling; frame-level noise never
    /// reaches here (dropped by the stream layer) and tool-level faults are
    /// folded into outcomes by the executor.
    async fn consume(
        &self,
        mut stream: EventStream,
        cancel: &CancellationToken,
    ) -> Result<LoopEnd, bridge_core::TransportError> {
        while let Some(item) = stream.next().await {
            if cancel.is_cancelled() {
                return Ok(LoopEnd::AbortedEarly);
            }
            let event = item?;

            // Observers see every event the backend sent, before any local
            // handling.
            self.forward(&event);

            match event.dispatch() {
                Dispatch::Ask(payload) => {
                    let reply = self.wait_for_reply(payload.agent.clone()).await;
                    if !reply.is_empty() && !cancel.is_cancelled() {
                        if let Some(session) = self.current_session() {
                            if !session.project_id.is_empty() {
                                self.backend
                                    .send_human_reply(&session.project_id, &payload.agent, &reply)
                                    .await?;
                            }
                        }
                    }
                }
                Dispatch::Tool(request) => {
                    // No active session: drop without side effects.
                    let Some(session) = self.current_session() else {
                        continue;
                    };
                    let outcome = self.tools.execute(&request.op).await;
                    self.backend
                        .send_tool_result(
                            &session.project_id,
                            &request.request_id,
                            request.tool_name(),
                            &outcome,
                        )
                        .await?;
                }
                Dispatch::Terminal(_) | Dispatch::Notice => {}
            }

            if event.step.is_terminal() {
                return Ok(LoopEnd::Exhausted);
            }
        }
        Ok(LoopEnd::Exhausted)
    }

    /// Suspend the dispatch loop until the human answers (or abort resolves
    /// the slot with an empty reply). A closed channel reads as empty.
    async fn wait_for_reply(&self, agent: AgentName) -> String {
        let (tx, rx) = oneshot::channel();
        {
            let mut slot = self.pending_reply.lock().unwrap();
            if slot.is_some() {
                warn!(agent = %agent, "superseding stale pending reply");
            }
            *slot = Some(PendingReply { agent, tx });
        }
        rx.await.unwrap_or_default()
    }

    /// Resolve the pending human-reply slot, if any. No-op otherwise.
    pub fn submit_human_reply(&self, reply: &str) {
        if let Some(pending) = self.pending_reply.lock().unwrap().take() {
            let _ = pending.tx.send(reply.to_string());
        }
    }

    /// Cooperative cancellation: takes effect at the next loop checkpoint,
    /// or immediately when a human-reply wait is suspended. The remote stop
    /// call is best-effort; abort must be unconditionally effective locally
    /// even if the notification fails.
    pub async fn abort_task(&self) {
        self.abort.lock().unwrap().cancel();

        if let Some(pending) = self.pending_reply.lock().unwrap().take() {
            // Empty reply unblocks the wait without sending anything.
            let _ = pending.tx.send(String::new());
        }

        if let Some(session) = self.current_session() {
            if let Err(e) = self.backend.stop_session(&session.project_id).await {
                warn!(error = %e, kind = e.error_kind(), "stop call failed during abort");
            }
        }

        let _ = self.observer_tx.send(ObserverEvent::Aborted);
    }

    /// Running while a non-empty project identifier is held and the abort
    /// flag is clear.
    pub fn is_running(&self) -> bool {
        let has_project = self
            .current_session()
            .is_some_and(|s| !s.project_id.is_empty());
        has_project && !self.abort.lock().unwrap().is_cancelled()
    }

    /// Agent name of the outstanding `ask`, if the loop is suspended on one.
    pub fn pending_reply_agent(&self) -> Option<AgentName> {
        self.pending_reply
            .lock()
            .unwrap()
            .as_ref()
            .map(|p| p.agent.clone())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    fn forward(&self, event: &ProtocolEvent) {
        if self
            .observer_tx
            .send(ObserverEvent::from_protocol(event))
            .is_err()
        {
            warn!(step = ?event.step, "no observers — event dropped");
        }
    }

    /// Failure before the loop even started: synthesize an error event
    /// unless the task was already aborted, then clear state.
    fn finish_failed(&self, cancel: &CancellationToken, message: String) -> TaskOutcome {
        self.session.lock().unwrap().take();
        if cancel.is_cancelled() {
            return TaskOutcome::Aborted;
        }
        self.forward(&ProtocolEvent::synthetic_error(message));
        TaskOutcome::Errored
    }
}
