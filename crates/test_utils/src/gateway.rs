//! Scripted Completion Gateway
//!
//! An in-process `CompletionPort` that answers from a queue of canned
//! replies and records every request it receives, so tests can assert on
//! the prompts the dispatcher built.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_actions::{CompletionPort, CompletionRequest, CompletionResponse};

const STUB_ID: &str = "stub-completion";

/// Scripted stand-in for the completion gateway
///
/// Replies are consumed in order; once the script runs out, the fallback
/// reply is returned for every further call.
pub struct StubCompletion {
    script: Mutex<VecDeque<Result<CompletionResponse, PortError>>>,
    fallback: String,
    requests: Mutex<Vec<CompletionRequest>>,
    health: AdapterHealth,
}

impl StubCompletion {
    /// A gateway that always answers with `content`
    pub fn replying(content: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: content.into(),
            requests: Mutex::new(Vec::new()),
            health: AdapterHealth::Healthy,
        }
    }

    /// A gateway that answers with a JSON document
    pub fn replying_json(value: &serde_json::Value) -> Self {
        Self::replying(value.to_string())
    }

    /// A gateway whose next call fails with `error`
    pub fn failing(error: PortError) -> Self {
        Self::replying("{}").then_err(error)
    }

    /// Queues a successful reply
    pub fn then_reply(self, content: impl Into<String>) -> Self {
        self.push(Ok(CompletionResponse::text(content)))
    }

    /// Queues a failure
    pub fn then_err(self, error: PortError) -> Self {
        self.push(Err(error))
    }

    /// Sets the status reported by `health_check`
    pub fn with_health(mut self, health: AdapterHealth) -> Self {
        self.health = health;
        self
    }

    fn push(self, reply: Result<CompletionResponse, PortError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(reply);
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests().pop()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl DomainPort for StubCompletion {}

#[async_trait]
impl CompletionPort for StubCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, PortError> {
        self.requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request);

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();

        scripted.unwrap_or_else(|| Ok(CompletionResponse::text(self.fallback.clone())))
    }
}

#[async_trait]
impl HealthCheckable for StubCompletion {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::new(STUB_ID, self.health, 0)
    }
}
