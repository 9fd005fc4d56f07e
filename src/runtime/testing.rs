//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use crate::backend::{
    AnswerFeedback, BackendError, Evaluation, InterviewBackend, NextStep, ReportData,
    StartedInterview,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// A call the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Start { candidate_name: String },
    Submit { session_id: String, answer: String },
    Report { session_id: String },
}

/// Mock backend that returns queued responses
pub struct MockBackend {
    starts: Mutex<VecDeque<Result<StartedInterview, BackendError>>>,
    answers: Mutex<VecDeque<Result<AnswerFeedback, BackendError>>>,
    reports: Mutex<VecDeque<Result<ReportData, BackendError>>>,
    /// Record of all calls made
    pub calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
    /// Notified when a call starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            starts: Mutex::new(VecDeque::new()),
            answers: Mutex::new(VecDeque::new()),
            reports: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            delay: None,
            request_started: Arc::new(Notify::new()),
        }
    }

    /// Sleep this long before answering every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_start(&self, session_id: &str, first_question: &str) {
        self.starts.lock().unwrap().push_back(Ok(StartedInterview {
            session_id: session_id.to_string(),
            first_question: first_question.to_string(),
        }));
    }

    pub fn queue_start_error(&self, error: BackendError) {
        self.starts.lock().unwrap().push_back(Err(error));
    }

    /// Queue an evaluation; `next_question: None` completes the interview
    pub fn queue_answer(&self, score: u8, rationale: &str, next_question: Option<&str>) {
        self.answers.lock().unwrap().push_back(Ok(AnswerFeedback {
            evaluation: Evaluation::new(score, rationale),
            next: next_question.map_or(NextStep::Complete, |q| NextStep::Question(q.to_string())),
        }));
    }

    pub fn queue_answer_error(&self, error: BackendError) {
        self.answers.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_report(&self, report: ReportData) {
        self.reports.lock().unwrap().push_back(Ok(report));
    }

    pub fn queue_report_error(&self, error: BackendError) {
        self.reports.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn begin(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
        self.request_started.notify_waiters();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, BackendError>>>) -> Result<T, BackendError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(BackendError::network("No mock response queued")))
}

#[async_trait]
impl InterviewBackend for MockBackend {
    async fn start_interview(&self, candidate_name: &str) -> Result<StartedInterview, BackendError> {
        self.begin(RecordedCall::Start {
            candidate_name: candidate_name.to_string(),
        })
        .await;
        next(&self.starts)
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerFeedback, BackendError> {
        self.begin(RecordedCall::Submit {
            session_id: session_id.to_string(),
            answer: answer.to_string(),
        })
        .await;
        next(&self.answers)
    }

    async fn fetch_report(&self, session_id: &str) -> Result<ReportData, BackendError> {
        self.begin(RecordedCall::Report {
            session_id: session_id.to_string(),
        })
        .await;
        next(&self.reports)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn sample_report(summary: &str) -> ReportData {
    ReportData {
        overall_recommendation: "Hire".to_string(),
        proficiency_score: 82,
        key_strengths: "- Lookups\n- Pivot tables".to_string(),
        areas_for_improvement: "- Macros".to_string(),
        summary: summary.to_string(),
    }
}
