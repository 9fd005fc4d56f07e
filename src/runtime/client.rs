//! Handle for driving a session runtime

use super::executor::{Command, SessionRuntime, UserAction};
use super::{SessionError, SessionSnapshot, Timeouts};
use crate::backend::{Evaluation, InterviewBackend, ReportData};
use crate::state_machine::{SessionContext, Settled, TransitionError};
use tokio::sync::{mpsc, oneshot, watch};

/// What the service said about an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub evaluation: Evaluation,
    /// `None` once the interview is complete
    pub next_question: Option<String>,
}

impl TurnOutcome {
    pub fn is_complete(&self) -> bool {
        self.next_question.is_none()
    }
}

/// Cloneable handle to one interview session
///
/// Every operation runs to completion before its future resolves. Actions
/// that conflict with a request already in flight are rejected with
/// [`TransitionError::Busy`](crate::state_machine::TransitionError::Busy),
/// never queued. The runtime stops once every handle is dropped.
#[derive(Clone)]
pub struct InterviewSessionClient {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl InterviewSessionClient {
    /// Spawn a runtime for a new session on the current tokio runtime
    pub fn spawn<B>(backend: B, context: SessionContext, timeouts: Timeouts) -> Self
    where
        B: InterviewBackend + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());

        let runtime = SessionRuntime::new(context, timeouts, backend, command_rx, snapshot_tx);
        tokio::spawn(runtime.run());

        Self {
            command_tx,
            snapshot_rx,
        }
    }

    /// Start the interview; resolves with the server-issued session id
    pub async fn start(&self, candidate_name: impl Into<String>) -> Result<String, SessionError> {
        let action = UserAction::Start {
            candidate_name: candidate_name.into(),
        };
        match self.send(action).await? {
            Some(Settled::Started { session_id }) => Ok(session_id),
            other => Err(unexpected(other)),
        }
    }

    /// Submit an answer to the current question
    pub async fn submit_answer(&self, text: impl Into<String>) -> Result<TurnOutcome, SessionError> {
        let action = UserAction::SubmitAnswer { text: text.into() };
        match self.send(action).await? {
            Some(Settled::Answered {
                evaluation,
                next_question,
            }) => Ok(TurnOutcome {
                evaluation,
                next_question,
            }),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch a fresh report for the completed interview and cache it
    pub async fn request_report(&self) -> Result<ReportData, SessionError> {
        match self.send(UserAction::RequestReport).await? {
            Some(Settled::ReportReady(report)) => Ok(report),
            other => Err(unexpected(other)),
        }
    }

    /// Drop the cached report
    pub async fn dismiss_report(&self) -> Result<(), SessionError> {
        self.send(UserAction::DismissReport).await.map(drop)
    }

    /// Abort the request in flight and restore the state from before it
    pub async fn cancel(&self) -> Result<(), SessionError> {
        self.send(UserAction::Cancel).await.map(drop)
    }

    /// Current state of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver notified after every processed event
    pub fn updates(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    async fn send(&self, action: UserAction) -> Result<Option<Settled>, SessionError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command { action, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)?
    }
}

/// A reply that does not belong to the action sent
fn unexpected(settled: Option<Settled>) -> SessionError {
    TransitionError::InvalidTransition(format!("Unexpected reply {settled:?}")).into()
}
