//! Interview service abstraction
//!
//! The service owns question selection, scoring, and report synthesis. This
//! module only knows how to call it.

mod error;
mod http;
mod types;
mod wire;


pub use error::{BackendError, BackendErrorKind};
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// The three remote operations of the interview service
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    /// Open a session and receive its first question
    async fn start_interview(&self, candidate_name: &str) -> Result<StartedInterview, BackendError>;

    /// Submit the answer to the current question of `session_id`
    async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerFeedback, BackendError>;

    /// Generate the final report for a completed session
    async fn fetch_report(&self, session_id: &str) -> Result<ReportData, BackendError>;

    /// Label used in logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: InterviewBackend + ?Sized> InterviewBackend for Arc<T> {
    async fn start_interview(&self, candidate_name: &str) -> Result<StartedInterview, BackendError> {
        (**self).start_interview(candidate_name).await
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerFeedback, BackendError> {
        (**self).submit_answer(session_id, answer).await
    }

    async fn fetch_report(&self, session_id: &str) -> Result<ReportData, BackendError> {
        (**self).fetch_report(session_id).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Logging wrapper for interview backends
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: InterviewBackend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    fn log_outcome<T>(
        &self,
        operation: &'static str,
        session_id: Option<&str>,
        started: std::time::Instant,
        result: &Result<T, BackendError>,
    ) {
        let duration = started.elapsed();
        match result {
            Ok(_) => {
                tracing::info!(
                    backend = %self.inner.name(),
                    operation,
                    session_id,
                    duration_ms = %duration.as_millis(),
                    "Interview request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.inner.name(),
                    operation,
                    session_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Interview request failed"
                );
            }
        }
    }
}

#[async_trait]
impl<B: InterviewBackend> InterviewBackend for LoggingBackend<B> {
    async fn start_interview(&self, candidate_name: &str) -> Result<StartedInterview, BackendError> {
        let started = std::time::Instant::now();
        let result = self.inner.start_interview(candidate_name).await;
        let session_id = result.as_ref().ok().map(|s| s.session_id.as_str());
        self.log_outcome("start", session_id, started, &result);
        result
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerFeedback, BackendError> {
        let started = std::time::Instant::now();
        let result = self.inner.submit_answer(session_id, answer).await;
        self.log_outcome("submit", Some(session_id), started, &result);
        result
    }

    async fn fetch_report(&self, session_id: &str) -> Result<ReportData, BackendError> {
        let started = std::time::Instant::now();
        let result = self.inner.fetch_report(session_id).await;
        self.log_outcome("report", Some(session_id), started, &result);
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
