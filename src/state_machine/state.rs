//! Session state types

use crate::backend::Evaluation;
use serde::Serialize;
use std::fmt;

// ============================================================================
// Transcript
// ============================================================================

/// Who produced a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Interviewer,
}

/// One transcript entry. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub text: String,
    pub speaker: Speaker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    pub is_question: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: Speaker::User,
            evaluation: None,
            is_question: false,
        }
    }

    pub fn interviewer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: Speaker::Interviewer,
            evaluation: None,
            is_question: false,
        }
    }

    pub fn question(text: impl Into<String>) -> Self {
        Self {
            is_question: true,
            ..Self::interviewer(text)
        }
    }

    /// Interviewer feedback on the preceding answer. Carries no text.
    pub fn evaluation(evaluation: Evaluation) -> Self {
        Self {
            evaluation: Some(evaluation),
            ..Self::interviewer(String::new())
        }
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Session state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session yet
    #[default]
    Idle,

    /// Start request in flight
    Starting { request_id: u64 },

    /// Waiting for the user to answer the current question
    AwaitingUserInput {
        session_id: String,
        /// Answers evaluated so far
        turn: u32,
    },

    /// Answer submitted, evaluation request in flight
    AwaitingEvaluation {
        session_id: String,
        turn: u32,
        request_id: u64,
    },

    /// Interview finished; a report fetch may be in flight
    Completed {
        session_id: String,
        turns: u32,
        report_request: Option<u64>,
    },
}

impl SessionState {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SessionState::Idle | SessionState::Starting { .. } => None,
            SessionState::AwaitingUserInput { session_id, .. }
            | SessionState::AwaitingEvaluation { session_id, .. }
            | SessionState::Completed { session_id, .. } => Some(session_id),
        }
    }

    /// Number of answers the service has evaluated
    pub fn turn_count(&self) -> u32 {
        match self {
            SessionState::Idle | SessionState::Starting { .. } => 0,
            SessionState::AwaitingUserInput { turn, .. }
            | SessionState::AwaitingEvaluation { turn, .. } => *turn,
            SessionState::Completed { turns, .. } => *turns,
        }
    }

    /// Id of the request this state is waiting on, if any
    pub fn pending_request(&self) -> Option<u64> {
        match self {
            SessionState::Starting { request_id }
            | SessionState::AwaitingEvaluation { request_id, .. } => Some(*request_id),
            SessionState::Completed { report_request, .. } => *report_request,
            SessionState::Idle | SessionState::AwaitingUserInput { .. } => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_request().is_some()
    }

    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Idle => SessionStatus::Idle,
            SessionState::Starting { .. } => SessionStatus::AwaitingFirstQuestion,
            SessionState::AwaitingUserInput { .. } => SessionStatus::AwaitingUserInput,
            SessionState::AwaitingEvaluation { .. } => SessionStatus::AwaitingEvaluation,
            SessionState::Completed {
                report_request: Some(_),
                ..
            } => SessionStatus::AwaitingReport,
            SessionState::Completed {
                report_request: None,
                ..
            } => SessionStatus::Complete,
        }
    }
}

/// Flat view of the session state for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    AwaitingFirstQuestion,
    AwaitingUserInput,
    AwaitingEvaluation,
    AwaitingReport,
    Complete,
}

/// Remote operation a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Submit,
    Report,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Start => "start interview",
            Operation::Submit => "submit answer",
            Operation::Report => "fetch report",
        })
    }
}

// ============================================================================
// Context
// ============================================================================

pub const DEFAULT_GREETING: &str = "Hello! I am your AI interviewer. Let's begin.";
pub const DEFAULT_CLOSING: &str = "Thank you. Your interview is now complete.";

/// Fixed interviewer lines for a session (immutable configuration)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub greeting: String,
    pub closing: String,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            closing: DEFAULT_CLOSING.to_string(),
        }
    }
}
