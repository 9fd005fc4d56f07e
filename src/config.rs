//! Client configuration
//!
//! Loaded once at startup from the environment.

use crate::runtime::Timeouts;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CANDIDATE_NAME: &str = "Test Candidate";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Interview service root, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Deadline for start and submit calls
    pub request_timeout: Duration,
    /// Deadline for report generation
    pub report_timeout: Duration,
    pub candidate_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            report_timeout: Duration::from_secs(DEFAULT_REPORT_TIMEOUT_SECS),
            candidate_name: DEFAULT_CANDIDATE_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| {
            Duration::from_secs(
                lookup(key)
                    .and_then(|s| s.trim().parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(default),
            )
        };

        Self {
            base_url: lookup("INTERVIEW_API_BASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: secs("INTERVIEW_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            report_timeout: secs("INTERVIEW_REPORT_TIMEOUT_SECS", DEFAULT_REPORT_TIMEOUT_SECS),
            candidate_name: lookup("INTERVIEW_CANDIDATE_NAME")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CANDIDATE_NAME.to_string()),
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            request: self.request_timeout,
            report: self.report_timeout,
        }
    }

    /// HTTP-level timeout; the runtime applies the per-operation deadlines
    pub fn http_timeout(&self) -> Duration {
        self.request_timeout.max(self.report_timeout)
    }
}
