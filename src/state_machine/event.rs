//! Events that can occur in a session

use super::state::Operation;
use crate::backend::{AnswerFeedback, ReportData, StartedInterview};
use std::time::Duration;

/// Events that trigger state transitions
///
/// User events that issue a request carry the id the runtime assigned to
/// that request; backend events echo it back so late results can be told
/// apart from the one the state is waiting on.
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Start {
        request_id: u64,
        candidate_name: String,
    },
    SubmitAnswer {
        request_id: u64,
        text: String,
    },
    RequestReport {
        request_id: u64,
    },
    DismissReport,
    Cancel,

    // Backend events
    StartSucceeded {
        request_id: u64,
        started: StartedInterview,
    },
    AnswerEvaluated {
        request_id: u64,
        feedback: AnswerFeedback,
    },
    ReportFetched {
        request_id: u64,
        report: ReportData,
    },
    RequestFailed {
        request_id: u64,
        failure: FailureKind,
        message: String,
    },
}

impl Event {
    /// Request id echoed by a backend event
    pub fn response_to(&self) -> Option<u64> {
        match self {
            Event::StartSucceeded { request_id, .. }
            | Event::AnswerEvaluated { request_id, .. }
            | Event::ReportFetched { request_id, .. }
            | Event::RequestFailed { request_id, .. } => Some(*request_id),
            Event::Start { .. }
            | Event::SubmitAnswer { .. }
            | Event::RequestReport { .. }
            | Event::DismissReport
            | Event::Cancel => None,
        }
    }

    /// Failure reported when a request outlives its deadline
    pub fn timed_out(request_id: u64, operation: Operation, after: Duration) -> Self {
        Event::RequestFailed {
            request_id,
            failure: FailureKind::Timeout,
            message: format!("{operation} timed out after {}s", after.as_secs_f32()),
        }
    }
}

/// Why a request did not produce a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx, unreachable service, or undecodable body
    Transport,
    /// Deadline elapsed before the service answered
    Timeout,
}
