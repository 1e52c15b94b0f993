//! Semantic arbiter contract and its HTTP client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbiterRequest {
    pub term: String,
    pub reference_answer: String,
    pub user_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbiterVerdict {
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
}

/// Any of these makes the grader fall back to local scoring.
#[derive(Debug, Error)]
pub enum ArbiterError {
    #[error("Arbiter request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Arbiter returned status {0}")]
    Status(u16),

    #[error("Malformed arbiter response: {0}")]
    Malformed(String),

    #[error("Arbiter timed out")]
    Timeout,

    #[error("No arbiter configured")]
    Unavailable,
}

/// External judge for free-text meaning answers
pub trait SemanticArbiter {
    fn judge(
        &self,
        request: &ArbiterRequest,
    ) -> impl Future<Output = Result<ArbiterVerdict, ArbiterError>> + Send;
}

/// Stand-in when no arbiter endpoint is configured; always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArbiter;

impl SemanticArbiter for NoArbiter {
    async fn judge(&self, _request: &ArbiterRequest) -> Result<ArbiterVerdict, ArbiterError> {
        Err(ArbiterError::Unavailable)
    }
}

/// Posts `{term, referenceAnswer, userAnswer}` as JSON and expects
/// `{isCorrect, feedback}` back.
#[derive(Debug, Clone)]
pub struct HttpArbiter {
    client: Client,
    endpoint: String,
}

impl HttpArbiter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ArbiterError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SemanticArbiter for HttpArbiter {
    async fn judge(&self, request: &ArbiterRequest) -> Result<ArbiterVerdict, ArbiterError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArbiterError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str::<ArbiterVerdict>(&body)
            .map_err(|e| ArbiterError::Malformed(e.to_string()))
    }
}
