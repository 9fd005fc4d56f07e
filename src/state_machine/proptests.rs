//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::backend::{AnswerFeedback, Evaluation, NextStep, ReportData, StartedInterview};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::default()
}

/// Session and transcript as the runtime would hold them
#[derive(Debug, Default)]
struct Harness {
    state: SessionState,
    transcript: Vec<Message>,
}

impl Harness {
    fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let result = transition(&self.state, &test_context(), event)?;
        self.state = result.new_state;
        for effect in &result.effects {
            if let Effect::AppendMessage(message) = effect {
                self.transcript.push(message.clone());
            }
        }
        Ok(result.effects)
    }
}

fn started(request_id: u64) -> Event {
    Event::StartSucceeded {
        request_id,
        started: StartedInterview {
            session_id: "session_1".to_string(),
            first_question: "Q1".to_string(),
        },
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_request_id() -> impl Strategy<Value = u64> {
    1u64..6
}

fn arb_answer() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,20}",
        "[ \t\n]{0,4}",
    ]
}

fn arb_feedback() -> impl Strategy<Value = AnswerFeedback> {
    (0u8..=5, "[a-z ]{0,20}", proptest::option::of("[A-Za-z?]{1,10}")).prop_map(
        |(score, rationale, next)| AnswerFeedback {
            evaluation: Evaluation::new(score, rationale),
            next: next.map_or(NextStep::Complete, NextStep::Question),
        },
    )
}

fn arb_report() -> impl Strategy<Value = ReportData> {
    (0u8..=100, "[a-zA-Z ]{0,20}").prop_map(|(proficiency_score, summary)| ReportData {
        overall_recommendation: "Hire".to_string(),
        proficiency_score,
        key_strengths: String::new(),
        areas_for_improvement: String::new(),
        summary,
    })
}

fn arb_failure_kind() -> impl Strategy<Value = FailureKind> {
    prop_oneof![Just(FailureKind::Transport), Just(FailureKind::Timeout)]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_request_id().prop_map(|request_id| Event::Start {
            request_id,
            candidate_name: "Test Candidate".to_string(),
        }),
        (arb_request_id(), arb_answer())
            .prop_map(|(request_id, text)| Event::SubmitAnswer { request_id, text }),
        arb_request_id().prop_map(|request_id| Event::RequestReport { request_id }),
        Just(Event::DismissReport),
        Just(Event::Cancel),
        arb_request_id().prop_map(started),
        (arb_request_id(), arb_feedback())
            .prop_map(|(request_id, feedback)| Event::AnswerEvaluated { request_id, feedback }),
        (arb_request_id(), arb_report())
            .prop_map(|(request_id, report)| Event::ReportFetched { request_id, report }),
        (arb_request_id(), arb_failure_kind()).prop_map(|(request_id, failure)| {
            Event::RequestFailed {
                request_id,
                failure,
                message: "failed".to_string(),
            }
        }),
    ]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn effects_are_valid(effects: &[Effect], new_state: &SessionState) -> bool {
    let requests: Vec<&Effect> = effects.iter().filter(|e| e.is_request()).collect();
    if requests.len() > 1 {
        return false;
    }

    // A request is only ever issued by a state that waits on that same id
    match requests.first() {
        Some(
            Effect::RequestStart { request_id, .. }
            | Effect::RequestEvaluation { request_id, .. }
            | Effect::RequestReport { request_id, .. },
        ) => new_state.pending_request() == Some(*request_id),
        _ => true,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: effects are consistent with the state they lead to
    #[test]
    fn prop_effects_match_new_state(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = SessionState::Idle;
        let ctx = test_context();

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                prop_assert!(
                    effects_are_valid(&result.effects, &result.new_state),
                    "Invalid effects for state {:?}: {:?}",
                    result.new_state,
                    result.effects
                );
                state = result.new_state;
            }
        }
    }

    // Invariant 2: once a session exists it is never lost, and turns never go backwards
    #[test]
    fn prop_session_and_turns_are_monotonic(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut harness = Harness::default();

        for event in events {
            let before_id = harness.state.session_id().map(str::to_string);
            let before_turns = harness.state.turn_count();
            let before_len = harness.transcript.len();

            let _ = harness.apply(event);

            if let Some(id) = before_id {
                prop_assert_eq!(harness.state.session_id(), Some(id.as_str()));
            }
            prop_assert!(harness.state.turn_count() >= before_turns);
            prop_assert!(harness.transcript.len() >= before_len);
        }
    }

    // Invariant 3: a rejected event leaves nothing behind
    #[test]
    fn prop_rejection_has_no_effects(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut harness = Harness::default();

        for event in events {
            let before_state = harness.state.clone();
            let before_len = harness.transcript.len();

            if harness.apply(event).is_err() {
                prop_assert_eq!(&harness.state, &before_state);
                prop_assert_eq!(harness.transcript.len(), before_len);
            }
        }
    }

    // Invariant 4: a backend result for a request the state is not waiting on changes nothing
    #[test]
    fn prop_stale_results_are_ignored(
        events in proptest::collection::vec(arb_event(), 0..20),
        stale in arb_event(),
    ) {
        let mut harness = Harness::default();
        for event in events {
            let _ = harness.apply(event);
        }

        if let Some(id) = stale.response_to() {
            if harness.state.pending_request() != Some(id) {
                let before = harness.state.clone();
                let effects = harness.apply(stale).unwrap();
                prop_assert!(effects.is_empty());
                prop_assert_eq!(harness.state, before);
            }
        }
    }

    // Invariant 5: whitespace-only answers are always rejected
    #[test]
    fn prop_blank_answers_rejected(text in "[ \t\r\n]{0,8}", turn in 0u32..10) {
        let state = SessionState::AwaitingUserInput {
            session_id: "session_1".to_string(),
            turn,
        };
        let result = transition(&state, &test_context(), Event::SubmitAnswer { request_id: 1, text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyAnswer);
    }

    // Invariant 6: a successful interview of k answers has 2 + 3k messages in fixed order
    #[test]
    fn prop_happy_path_transcript_shape(answers in proptest::collection::vec("[a-z0-9]{1,12}", 1..8)) {
        let mut harness = Harness::default();
        let mut request_id = 1;

        harness.apply(Event::Start { request_id, candidate_name: "Test Candidate".to_string() }).unwrap();
        harness.apply(started(request_id)).unwrap();

        let k = answers.len();
        for (i, answer) in answers.iter().enumerate() {
            request_id += 1;
            harness.apply(Event::SubmitAnswer { request_id, text: answer.clone() }).unwrap();
            let next = if i + 1 == k {
                NextStep::Complete
            } else {
                NextStep::Question(format!("Q{}", i + 2))
            };
            harness.apply(Event::AnswerEvaluated {
                request_id,
                feedback: AnswerFeedback { evaluation: Evaluation::new(3, "ok"), next },
            }).unwrap();
        }

        prop_assert_eq!(harness.transcript.len(), 2 + 3 * k);
        prop_assert_eq!(harness.state.status(), SessionStatus::Complete);
        prop_assert_eq!(harness.state.turn_count() as usize, k);

        for (i, answer) in answers.iter().enumerate() {
            let base = 2 + 3 * i;
            prop_assert_eq!(&harness.transcript[base], &Message::user(answer.clone()));
            prop_assert!(harness.transcript[base + 1].evaluation.is_some());
            let follow = &harness.transcript[base + 2];
            prop_assert_eq!(follow.is_question, i + 1 < k);
        }
    }

    // Invariant 7: a failed submit keeps the user message, adds no evaluation, and accepts a retry
    #[test]
    fn prop_failed_submit_allows_retry(answer in "[a-z]{1,10}", failure in arb_failure_kind()) {
        let mut harness = Harness::default();
        harness.apply(Event::Start { request_id: 1, candidate_name: "x".to_string() }).unwrap();
        harness.apply(started(1)).unwrap();
        harness.apply(Event::SubmitAnswer { request_id: 2, text: answer.clone() }).unwrap();
        harness.apply(Event::RequestFailed { request_id: 2, failure, message: "down".to_string() }).unwrap();

        prop_assert_eq!(harness.transcript.len(), 3);
        prop_assert_eq!(harness.transcript.last(), Some(&Message::user(answer.clone())));
        prop_assert!(harness.transcript.iter().all(|m| m.evaluation.is_none()));
        prop_assert_eq!(harness.state.status(), SessionStatus::AwaitingUserInput);

        let effects = harness.apply(Event::SubmitAnswer { request_id: 3, text: answer }).unwrap();
        prop_assert!(effects.iter().any(Effect::is_request));
    }
}
