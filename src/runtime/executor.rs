//! Session runtime executor

use super::{SessionError, SessionSnapshot, Timeouts};
use crate::backend::{InterviewBackend, ReportData};
use crate::state_machine::{
    transition, Effect, Event, FailureKind, Message, Operation, Outcome, SessionContext,
    SessionState, Settled, TransitionResult,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

/// How a caller's action ended; `None` when it issued no request
pub(super) type ReplyResult = Result<Option<Settled>, SessionError>;

/// Channel a caller waits on for the end of its action
pub(super) type Reply = oneshot::Sender<ReplyResult>;

/// User actions accepted by the runtime
#[derive(Debug, Clone)]
pub(super) enum UserAction {
    Start { candidate_name: String },
    SubmitAnswer { text: String },
    RequestReport,
    DismissReport,
    Cancel,
}

impl UserAction {
    fn into_event(self, request_id: u64) -> Event {
        match self {
            UserAction::Start { candidate_name } => Event::Start {
                request_id,
                candidate_name,
            },
            UserAction::SubmitAnswer { text } => Event::SubmitAnswer { request_id, text },
            UserAction::RequestReport => Event::RequestReport { request_id },
            UserAction::DismissReport => Event::DismissReport,
            UserAction::Cancel => Event::Cancel,
        }
    }
}

#[derive(Debug)]
pub(super) struct Command {
    pub action: UserAction,
    pub reply: Reply,
}

/// A backend call waiting to run
#[derive(Debug)]
enum BackendCall {
    Start { candidate_name: String },
    Submit { session_id: String, answer: String },
    Report { session_id: String },
}

impl BackendCall {
    fn operation(&self) -> Operation {
        match self {
            BackendCall::Start { .. } => Operation::Start,
            BackendCall::Submit { .. } => Operation::Submit,
            BackendCall::Report { .. } => Operation::Report,
        }
    }

    async fn execute<B: InterviewBackend + ?Sized>(self, backend: &B, request_id: u64) -> Event {
        let result = match self {
            BackendCall::Start { candidate_name } => backend
                .start_interview(&candidate_name)
                .await
                .map(|started| Event::StartSucceeded {
                    request_id,
                    started,
                }),
            BackendCall::Submit { session_id, answer } => backend
                .submit_answer(&session_id, &answer)
                .await
                .map(|feedback| Event::AnswerEvaluated {
                    request_id,
                    feedback,
                }),
            BackendCall::Report { session_id } => backend
                .fetch_report(&session_id)
                .await
                .map(|report| Event::ReportFetched { request_id, report }),
        };

        result.unwrap_or_else(|e| Event::RequestFailed {
            request_id,
            failure: if e.is_timeout() {
                FailureKind::Timeout
            } else {
                FailureKind::Transport
            },
            message: e.message,
        })
    }
}

/// The request currently in flight
struct InFlight {
    request_id: u64,
    cancel: CancellationToken,
    /// Caller waiting for the outcome
    waiter: Option<Reply>,
}

/// Owns one session and executes the effects of its transitions
pub(super) struct SessionRuntime<B>
where
    B: InterviewBackend + 'static,
{
    context: SessionContext,
    timeouts: Timeouts,
    state: SessionState,
    transcript: Vec<Message>,
    report: Option<ReportData>,
    backend: Arc<B>,
    command_rx: mpsc::Receiver<Command>,
    result_tx: mpsc::Sender<Event>,
    result_rx: mpsc::Receiver<Event>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    in_flight: Option<InFlight>,
    last_request_id: u64,
}

impl<B> SessionRuntime<B>
where
    B: InterviewBackend + 'static,
{
    pub fn new(
        context: SessionContext,
        timeouts: Timeouts,
        backend: B,
        command_rx: mpsc::Receiver<Command>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(8);
        Self {
            context,
            timeouts,
            state: SessionState::Idle,
            transcript: Vec::new(),
            report: None,
            backend: Arc::new(backend),
            command_rx,
            result_tx,
            result_rx,
            snapshot_tx,
            in_flight: None,
            last_request_id: 0,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(backend = %self.backend.name(), "Starting session runtime");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.result_rx.recv() => self.handle_result(event),
            }
        }

        // Every client handle is gone; nobody can observe a late result.
        if let Some(waiter) = self.abort_in_flight() {
            let _ = waiter.send(Err(SessionError::Closed));
        }

        tracing::info!(
            session_id = ?self.state.session_id(),
            "Session runtime stopped"
        );
    }

    fn handle_command(&mut self, command: Command) {
        let Command { action, reply } = command;
        self.last_request_id += 1;
        let event = action.into_event(self.last_request_id);

        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, state = ?self.state.status(), "Rejected user action");
                let _ = reply.send(Err(e.into()));
                return;
            }
        };

        let mut reply = Some(reply);
        self.apply(result, &mut reply);

        // Actions that issued no request are finished already
        if let Some(reply) = reply {
            let _ = reply.send(Ok(None));
        }
    }

    fn handle_result(&mut self, event: Event) {
        match transition(&self.state, &self.context, event) {
            Ok(result) => {
                if result.effects.is_empty() {
                    tracing::debug!("Ignoring result of a request that is no longer awaited");
                }
                self.apply(result, &mut None);
            }
            Err(e) => {
                tracing::error!(error = %e, "Backend result could not be applied");
            }
        }
    }

    fn apply(&mut self, result: TransitionResult, reply: &mut Option<Reply>) {
        self.state = result.new_state;
        let mut resolved: Vec<(Reply, ReplyResult)> = Vec::new();

        for effect in result.effects {
            match effect {
                Effect::AppendMessage(message) => self.transcript.push(message),
                Effect::RequestStart {
                    request_id,
                    candidate_name,
                } => self.spawn_request(
                    request_id,
                    BackendCall::Start { candidate_name },
                    reply.take(),
                ),
                Effect::RequestEvaluation {
                    request_id,
                    session_id,
                    answer,
                } => self.spawn_request(
                    request_id,
                    BackendCall::Submit { session_id, answer },
                    reply.take(),
                ),
                Effect::RequestReport {
                    request_id,
                    session_id,
                } => self.spawn_request(
                    request_id,
                    BackendCall::Report { session_id },
                    reply.take(),
                ),
                Effect::AbortRequest => {
                    if let Some(waiter) = self.abort_in_flight() {
                        resolved.push((waiter, Err(SessionError::Cancelled)));
                    }
                }
                Effect::CacheReport(report) => self.report = Some(report),
                Effect::ClearReport => self.report = None,
                Effect::Settle(outcome) => {
                    if let Some(waiter) = self.settle(&outcome) {
                        resolved.push((waiter, outcome.map(Some).map_err(SessionError::from)));
                    }
                }
            }
        }

        // Callers must find the snapshot up to date once their action resolves
        self.publish();
        for (waiter, result) in resolved {
            let _ = waiter.send(result);
        }
    }

    fn spawn_request(&mut self, request_id: u64, call: BackendCall, waiter: Option<Reply>) {
        let operation = call.operation();
        let deadline = self.timeouts.for_operation(operation);
        let cancel = CancellationToken::new();

        if let Some(previous) = self.in_flight.replace(InFlight {
            request_id,
            cancel: cancel.clone(),
            waiter,
        }) {
            // The state machine allows one request at a time; this is a bug if hit
            tracing::error!(
                previous = previous.request_id,
                request_id,
                "Request issued while another was in flight"
            );
            previous.cancel.cancel();
        }

        let backend = self.backend.clone();
        let result_tx = self.result_tx.clone();

        tokio::spawn(async move {
            tracing::debug!(request_id, %operation, "Sending request");

            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::info!(request_id, %operation, "Request cancelled");
                }

                result = tokio::time::timeout(deadline, call.execute(backend.as_ref(), request_id)) => {
                    let event = result.unwrap_or_else(|_| {
                        tracing::warn!(request_id, %operation, ?deadline, "Request timed out");
                        Event::timed_out(request_id, operation, deadline)
                    });
                    let _ = result_tx.send(event).await;
                }
            }
        });
    }

    /// Cancel the request in flight; returns its waiter
    fn abort_in_flight(&mut self) -> Option<Reply> {
        let in_flight = self.in_flight.take()?;
        in_flight.cancel.cancel();
        in_flight.waiter
    }

    /// Finish the request in flight; returns its waiter
    fn settle(&mut self, outcome: &Outcome) -> Option<Reply> {
        let Some(in_flight) = self.in_flight.take() else {
            tracing::warn!("Settled an operation with no request in flight");
            return None;
        };
        if let Err(failure) = outcome {
            tracing::warn!(
                request_id = in_flight.request_id,
                operation = %failure.operation,
                error = %failure.message,
                "Operation failed"
            );
        }
        in_flight.waiter
    }

    fn publish(&self) {
        let snapshot =
            SessionSnapshot::capture(&self.state, &self.transcript, self.report.as_ref());
        self.snapshot_tx.send_replace(snapshot);
    }
}
