//! JSON bodies exchanged with the interview service
//!
//! Evaluations and reports are produced by a language model on the server,
//! so numeric and list fields arrive in more than one shape. Decoding here is
//! lenient: scores may be integers, floats, or strings such as `"4.5/5"`, and
//! bulleted sections may be a string or a list of strings.

use super::types::{
    AnswerFeedback, Evaluation, NextStep, ReportData, StartedInterview, MAX_ANSWER_SCORE,
    MAX_PROFICIENCY_SCORE,
};
use super::BackendError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

const MISSING_TEXT: &str = "N/A";

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(\.\d+)?)").expect("number pattern is valid"));

#[derive(Debug, Serialize)]
pub(super) struct StartRequest<'a> {
    pub candidate_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct StartResponse {
    session_id: String,
    first_question: String,
}

impl From<StartResponse> for StartedInterview {
    fn from(resp: StartResponse) -> Self {
        StartedInterview {
            session_id: resp.session_id,
            first_question: resp.first_question,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub answer: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponse {
    evaluation: EvaluationPayload,
    #[serde(default)]
    is_complete: bool,
    #[serde(default)]
    next_question: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluationPayload {
    #[serde(default)]
    score: Value,
    #[serde(default)]
    evaluation: Value,
}

impl TryFrom<ChatResponse> for AnswerFeedback {
    type Error = BackendError;

    fn try_from(resp: ChatResponse) -> Result<Self, Self::Error> {
        let evaluation = Evaluation::new(
            clamp_score(&resp.evaluation.score, MAX_ANSWER_SCORE),
            text_or(&resp.evaluation.evaluation, ""),
        );

        let next = if resp.is_complete {
            NextStep::Complete
        } else {
            match resp.next_question {
                Some(question) if !question.trim().is_empty() => NextStep::Question(question),
                _ => {
                    return Err(BackendError::malformed(
                        "Interview is not complete but no next question was sent",
                    ))
                }
            }
        };

        Ok(AnswerFeedback { evaluation, next })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ReportResponse {
    #[serde(default, alias = "Recommendation")]
    overall_recommendation: Value,
    #[serde(default, alias = "Overall_Skill_Score")]
    proficiency_score: Value,
    #[serde(default, alias = "Key_Strengths")]
    key_strengths: Value,
    #[serde(default, alias = "Areas_for_Improvement")]
    areas_for_improvement: Value,
    #[serde(default, alias = "Professional_Summary")]
    summary: Value,
}

impl From<ReportResponse> for ReportData {
    fn from(resp: ReportResponse) -> Self {
        ReportData {
            overall_recommendation: text_or(&resp.overall_recommendation, MISSING_TEXT),
            proficiency_score: clamp_score(&resp.proficiency_score, MAX_PROFICIENCY_SCORE),
            key_strengths: bulleted(&resp.key_strengths),
            areas_for_improvement: bulleted(&resp.areas_for_improvement),
            summary: text_or(&resp.summary, MISSING_TEXT),
        }
    }
}

/// Error body FastAPI sends with non-2xx responses
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub detail: Value,
}

/// Pull a readable message out of an error body, falling back to the raw text
pub(super) fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn clamp_score(value: &Value, max: u8) -> u8 {
    let score = parse_score(value).min(u64::from(max));
    u8::try_from(score).unwrap_or(max)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // truncation is the intent
fn parse_score(value: &Value) -> u64 {
    let float_to_score = |f: f64| if f.is_finite() && f > 0.0 { f as u64 } else { 0 };
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(float_to_score))
            .unwrap_or(0),
        Value::String(s) => leading_number(s).map_or(0, float_to_score),
        _ => 0,
    }
}

/// First decimal number appearing in `text`, e.g. `4.5` from `"Score: 4.5/5"`
fn leading_number(text: &str) -> Option<f64> {
    NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn text_or(value: &Value, fallback: &str) -> String {
    match value {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::String(_) | Value::Null => fallback.to_string(),
        other => other.to_string(),
    }
}

fn bulleted(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if !items.is_empty() => {
            let lines: Vec<String> = items.iter().map(|item| text_or(item, "")).collect();
            format!("- {}", lines.join("\n- "))
        }
        _ => String::new(),
    }
}
