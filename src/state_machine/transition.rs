//! Pure state transition function

use super::effect::Settled;
use super::state::{Message, Operation};
use super::{Effect, Event, SessionContext, SessionState};
use crate::backend::NextStep;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons a user action is rejected before any request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("An interview has already been started")]
    AlreadyStarted,
    #[error("No interview session is active")]
    NoSession,
    #[error("Answer is empty")]
    EmptyAnswer,
    #[error("A request is already in progress")]
    Busy,
    #[error("The interview is already complete")]
    InterviewComplete,
    #[error("The interview is not complete yet")]
    InterviewNotComplete,
    #[error("No request is in progress")]
    NothingToCancel,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs; all I/O is
/// described by the returned effects.
#[allow(clippy::too_many_lines)]
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    // A result for any request other than the one in flight is stale
    // (cancelled, timed out, or superseded) and must not apply.
    if let Some(request_id) = event.response_to() {
        if state.pending_request() != Some(request_id) {
            return Ok(TransitionResult::new(state.clone()));
        }
    }

    match (state, event) {
        // ============================================================
        // Start
        // ============================================================
        (
            SessionState::Idle,
            Event::Start {
                request_id,
                candidate_name,
            },
        ) => Ok(
            TransitionResult::new(SessionState::Starting { request_id }).with_effect(
                Effect::RequestStart {
                    request_id,
                    candidate_name,
                },
            ),
        ),

        (state, Event::Start { .. }) if state.is_busy() => Err(TransitionError::Busy),
        (_, Event::Start { .. }) => Err(TransitionError::AlreadyStarted),

        (SessionState::Starting { .. }, Event::StartSucceeded { started, .. }) => Ok(
            TransitionResult::new(SessionState::AwaitingUserInput {
                session_id: started.session_id.clone(),
                turn: 0,
            })
            .with_effects([
                Effect::append(Message::interviewer(&context.greeting)),
                Effect::append(Message::question(started.first_question)),
                Effect::Settle(Ok(Settled::Started {
                    session_id: started.session_id,
                })),
            ]),
        ),

        (SessionState::Starting { .. }, Event::RequestFailed { failure, message, .. }) => Ok(
            TransitionResult::new(SessionState::Idle).with_effect(Effect::settle_failure(
                Operation::Start,
                failure,
                message,
            )),
        ),

        // ============================================================
        // Answers
        // ============================================================
        (
            SessionState::AwaitingUserInput { session_id, turn },
            Event::SubmitAnswer { request_id, text },
        ) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyAnswer);
            }
            Ok(TransitionResult::new(SessionState::AwaitingEvaluation {
                session_id: session_id.clone(),
                turn: *turn,
                request_id,
            })
            .with_effect(Effect::append(Message::user(text.clone())))
            .with_effect(Effect::RequestEvaluation {
                request_id,
                session_id: session_id.clone(),
                answer: text,
            }))
        }

        (SessionState::Idle, Event::SubmitAnswer { .. }) => Err(TransitionError::NoSession),
        (SessionState::Completed { .. }, Event::SubmitAnswer { .. }) => {
            Err(TransitionError::InterviewComplete)
        }
        (_, Event::SubmitAnswer { .. }) => Err(TransitionError::Busy),

        (
            SessionState::AwaitingEvaluation {
                session_id, turn, ..
            },
            Event::AnswerEvaluated { feedback, .. },
        ) => {
            let turn = turn.saturating_add(1);
            let evaluation = feedback.evaluation;
            match feedback.next {
                NextStep::Question(question) => Ok(TransitionResult::new(
                    SessionState::AwaitingUserInput {
                        session_id: session_id.clone(),
                        turn,
                    },
                )
                .with_effects([
                    Effect::append(Message::evaluation(evaluation.clone())),
                    Effect::append(Message::question(question.clone())),
                    Effect::Settle(Ok(Settled::Answered {
                        evaluation,
                        next_question: Some(question),
                    })),
                ])),
                NextStep::Complete => Ok(TransitionResult::new(SessionState::Completed {
                    session_id: session_id.clone(),
                    turns: turn,
                    report_request: None,
                })
                .with_effects([
                    Effect::append(Message::evaluation(evaluation.clone())),
                    Effect::append(Message::interviewer(&context.closing)),
                    Effect::Settle(Ok(Settled::Answered {
                        evaluation,
                        next_question: None,
                    })),
                ])),
            }
        }

        // The optimistic user message stays; the user may resubmit.
        (
            SessionState::AwaitingEvaluation {
                session_id, turn, ..
            },
            Event::RequestFailed { failure, message, .. },
        ) => Ok(TransitionResult::new(SessionState::AwaitingUserInput {
            session_id: session_id.clone(),
            turn: *turn,
        })
        .with_effect(Effect::settle_failure(
            Operation::Submit,
            failure,
            message,
        ))),

        // ============================================================
        // Report
        // ============================================================
        (
            SessionState::Completed {
                session_id,
                turns,
                report_request: None,
            },
            Event::RequestReport { request_id },
        ) => Ok(TransitionResult::new(SessionState::Completed {
            session_id: session_id.clone(),
            turns: *turns,
            report_request: Some(request_id),
        })
        .with_effect(Effect::RequestReport {
            request_id,
            session_id: session_id.clone(),
        })),

        (state, Event::RequestReport { .. }) if state.is_busy() => Err(TransitionError::Busy),
        (_, Event::RequestReport { .. }) => Err(TransitionError::InterviewNotComplete),

        (
            SessionState::Completed {
                session_id, turns, ..
            },
            Event::ReportFetched { report, .. },
        ) => Ok(TransitionResult::new(SessionState::Completed {
            session_id: session_id.clone(),
            turns: *turns,
            report_request: None,
        })
        .with_effects([
            Effect::CacheReport(report.clone()),
            Effect::Settle(Ok(Settled::ReportReady(report))),
        ])),

        (
            SessionState::Completed {
                session_id, turns, ..
            },
            Event::RequestFailed { failure, message, .. },
        ) => Ok(TransitionResult::new(SessionState::Completed {
            session_id: session_id.clone(),
            turns: *turns,
            report_request: None,
        })
        .with_effects([
            Effect::ClearReport,
            Effect::settle_failure(Operation::Report, failure, message),
        ])),

        (state, Event::DismissReport) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::ClearReport))
        }

        // ============================================================
        // Cancellation: restore the state from before the request
        // ============================================================
        (SessionState::Starting { .. }, Event::Cancel) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::AbortRequest))
        }

        (
            SessionState::AwaitingEvaluation {
                session_id, turn, ..
            },
            Event::Cancel,
        ) => Ok(TransitionResult::new(SessionState::AwaitingUserInput {
            session_id: session_id.clone(),
            turn: *turn,
        })
        .with_effect(Effect::AbortRequest)),

        (
            SessionState::Completed {
                session_id,
                turns,
                report_request: Some(_),
            },
            Event::Cancel,
        ) => Ok(TransitionResult::new(SessionState::Completed {
            session_id: session_id.clone(),
            turns: *turns,
            report_request: None,
        })
        .with_effect(Effect::AbortRequest)),

        (_, Event::Cancel) => Err(TransitionError::NothingToCancel),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
