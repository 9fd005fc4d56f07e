//! HTTP/JSON implementation of the interview service

use super::types::{AnswerFeedback, ReportData, StartedInterview};
use super::wire::{self, ChatRequest, ChatResponse, ReportResponse, StartRequest, StartResponse};
use super::{BackendError, InterviewBackend};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the interview service REST API
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            BackendError::invalid_request(format!("Invalid base URL {base_url}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::invalid_request(format!(
                "Base URL {base_url} cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("interview-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Build `base/segments...`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::invalid_request("Base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await.map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            BackendError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

fn classify_transport(e: &reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::timeout(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        BackendError::network(format!("Connection failed: {e}"))
    } else {
        BackendError::unknown(format!("Request failed: {e}"))
    }
}

fn classify_status(status: StatusCode, body: &str) -> BackendError {
    let message = wire::error_detail(body);
    match status.as_u16() {
        404 => BackendError::not_found(format!("Not found: {message}")),
        400 | 422 => BackendError::invalid_request(format!("Invalid request: {message}")),
        500..=599 => BackendError::server_error(format!("Server error: {message}")),
        _ => BackendError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl InterviewBackend for HttpBackend {
    async fn start_interview(&self, candidate_name: &str) -> Result<StartedInterview, BackendError> {
        let url = self.endpoint(&["interview", "start"])?;
        let resp: StartResponse = self
            .read_json(self.client.post(url).json(&StartRequest { candidate_name }))
            .await?;
        Ok(resp.into())
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<AnswerFeedback, BackendError> {
        let url = self.endpoint(&["interview", "chat"])?;
        let resp: ChatResponse = self
            .read_json(self.client.post(url).json(&ChatRequest { session_id, answer }))
            .await?;
        AnswerFeedback::try_from(resp)
    }

    async fn fetch_report(&self, session_id: &str) -> Result<ReportData, BackendError> {
        let url = self.endpoint(&["interview", "report", session_id])?;
        let resp: ReportResponse = self.read_json(self.client.get(url)).await?;
        Ok(resp.into())
    }

    fn name(&self) -> &str {
        self.base_url.as_str()
    }
}
