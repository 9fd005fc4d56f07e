//! Runtime for driving an interview session
//!
//! A single task owns the session state and transcript. Callers talk to it
//! through [`InterviewSessionClient`]; backend calls run in spawned tasks and
//! report back as events.

mod client;
mod executor;

#[cfg(test)]
pub mod testing;


pub use client::{InterviewSessionClient, TurnOutcome};

use crate::backend::ReportData;
use crate::state_machine::{
    Failure, FailureKind, Message, Operation, SessionState, SessionStatus, TransitionError,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of [`InterviewSessionClient`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Could not start the interview: {0}")]
    StartFailed(String),
    #[error("Could not submit the answer: {0}")]
    SubmitFailed(String),
    #[error("Could not fetch the report: {0}")]
    ReportFetchFailed(String),
    #[error("{message}")]
    Timeout { operation: Operation, message: String },
    #[error(transparent)]
    PreconditionViolation(#[from] TransitionError),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Session runtime has stopped")]
    Closed,
}

impl SessionError {
    /// Whether repeating the same action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::StartFailed(_)
                | SessionError::SubmitFailed(_)
                | SessionError::ReportFetchFailed(_)
                | SessionError::Timeout { .. }
                | SessionError::Cancelled
        )
    }
}

impl From<Failure> for SessionError {
    fn from(failure: Failure) -> Self {
        let Failure {
            operation,
            kind,
            message,
        } = failure;
        match (kind, operation) {
            (FailureKind::Timeout, operation) => SessionError::Timeout { operation, message },
            (FailureKind::Transport, Operation::Start) => SessionError::StartFailed(message),
            (FailureKind::Transport, Operation::Submit) => SessionError::SubmitFailed(message),
            (FailureKind::Transport, Operation::Report) => SessionError::ReportFetchFailed(message),
        }
    }
}

/// Deadlines applied to backend calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Start and submit calls
    pub request: Duration,
    /// Report generation, usually slower
    pub report: Duration,
}

impl Timeouts {
    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Start | Operation::Submit => self.request,
            Operation::Report => self.report,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(60),
            report: Duration::from_secs(120),
        }
    }
}

/// Immutable view of the session published after every processed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub turn_count: u32,
    pub transcript: Vec<Message>,
    pub report: Option<ReportData>,
}

impl SessionSnapshot {
    fn capture(state: &SessionState, transcript: &[Message], report: Option<&ReportData>) -> Self {
        Self {
            status: state.status(),
            session_id: state.session_id().map(str::to_string),
            turn_count: state.turn_count(),
            transcript: transcript.to_vec(),
            report: report.cloned(),
        }
    }
}
