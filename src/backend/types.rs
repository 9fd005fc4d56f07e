//! Domain types returned by the interview service

use serde::Serialize;

/// Highest per-answer score the service awards
pub const MAX_ANSWER_SCORE: u8 = 5;

/// Highest overall proficiency score in a report
pub const MAX_PROFICIENCY_SCORE: u8 = 100;

/// Score and rationale for a single answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Always within `0..=MAX_ANSWER_SCORE`
    pub score: u8,
    pub rationale: String,
}

impl Evaluation {
    pub fn new(score: u8, rationale: impl Into<String>) -> Self {
        Self {
            score: score.min(MAX_ANSWER_SCORE),
            rationale: rationale.into(),
        }
    }
}

/// End-of-interview summary produced by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportData {
    pub overall_recommendation: String,
    /// Always within `0..=MAX_PROFICIENCY_SCORE`
    pub proficiency_score: u8,
    pub key_strengths: String,
    pub areas_for_improvement: String,
    pub summary: String,
}

impl ReportData {
    /// Whether the recommendation is some form of hire
    pub fn recommends_hire(&self) -> bool {
        let recommendation = self.overall_recommendation.to_ascii_lowercase();
        recommendation.contains("hire") && !recommendation.contains("not hire")
    }
}

/// Result of starting an interview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedInterview {
    pub session_id: String,
    pub first_question: String,
}

/// What follows an evaluated answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Question(String),
    Complete,
}

/// Result of submitting an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub evaluation: Evaluation,
    pub next: NextStep,
}

impl AnswerFeedback {
    pub fn is_complete(&self) -> bool {
        matches!(self.next, NextStep::Complete)
    }
}
