//! Effects produced by state transitions

use super::event::FailureKind;
use super::state::{Message, Operation};
use crate::backend::{Evaluation, ReportData};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the transcript
    AppendMessage(Message),

    /// Call `start_interview`
    RequestStart {
        request_id: u64,
        candidate_name: String,
    },

    /// Call `submit_answer`
    RequestEvaluation {
        request_id: u64,
        session_id: String,
        answer: String,
    },

    /// Call `fetch_report`
    RequestReport { request_id: u64, session_id: String },

    /// Abort the request currently in flight
    AbortRequest,

    /// Replace the cached report
    CacheReport(ReportData),

    /// Drop the cached report
    ClearReport,

    /// Resolve the operation that issued the finished request
    Settle(Outcome),
}

impl Effect {
    pub fn append(message: Message) -> Self {
        Effect::AppendMessage(message)
    }

    pub fn settle_failure(operation: Operation, failure: FailureKind, message: String) -> Self {
        Effect::Settle(Err(Failure {
            operation,
            kind: failure,
            message,
        }))
    }

    /// Whether this effect issues a backend request
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Effect::RequestStart { .. }
                | Effect::RequestEvaluation { .. }
                | Effect::RequestReport { .. }
        )
    }
}

/// How an in-flight operation ended
pub type Outcome = Result<Settled, Failure>;

/// Successful end of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    Started {
        session_id: String,
    },
    Answered {
        evaluation: Evaluation,
        /// `None` when the interview is complete
        next_question: Option<String>,
    },
    ReportReady(ReportData),
}

/// Failed end of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub operation: Operation,
    pub kind: FailureKind,
    pub message: String,
}
