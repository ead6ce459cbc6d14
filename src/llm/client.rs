use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::retry::{NoRetry, RetryPolicy};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatExchange};
use crate::config::ModelConfig;
use crate::error::{ApiError, ApiResult, AppResult};

/// Sends one system+user prompt pair and returns the completion text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run a single exchange. Any transport or response failure is an
    /// [`ApiError`]; there are no partial results.
    async fn chat(&self, exchange: ChatExchange) -> ApiResult<String>;
}

/// Client for OpenAI-compatible chat-completion endpoints
#[derive(Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    config: Arc<ModelConfig>,
    timeout: Duration,
    retry_policy: Arc<dyn RetryPolicy>,
}

impl OpenAiCompatClient {
    /// Create a new client. An unusable timeout is a config error; the
    /// credential is checked at call time.
    pub fn new(config: ModelConfig) -> AppResult<Self> {
        let timeout = config.timeout()?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            config: Arc::new(config),
            timeout,
            retry_policy: Arc::new(NoRetry),
        })
    }

    /// Replace the retry policy (default: [`NoRetry`])
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry_policy = Arc::new(policy);
        self
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Execute a single request (internal)
    async fn execute_request(&self, body: &ChatCompletionRequest) -> ApiResult<String> {
        let provider = &self.config.provider;
        let url = self.config.endpoint();

        debug!(
            provider = %provider,
            url = %url,
            temperature = body.temperature,
            "Calling chat completion endpoint"
        );

        let payload = serde_json::to_vec(body).map_err(|e| ApiError::Transport {
            provider: provider.clone(),
            message: format!("failed to encode request: {}", e),
        })?;

        let mut request = self.client.post(&url);
        for (key, value) in &self.config.headers {
            if key.eq_ignore_ascii_case("authorization") {
                continue;
            }
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout {
                        provider: provider.clone(),
                        timeout_ms: self.timeout_ms(),
                    }
                } else {
                    ApiError::Transport {
                        provider: provider.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    provider: provider.clone(),
                    timeout_ms: self.timeout_ms(),
                }
            } else {
                ApiError::Transport {
                    provider: provider.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                provider: provider.clone(),
                status: status.as_u16(),
                body: raw,
            });
        }

        let invalid = || ApiError::InvalidResponse {
            provider: provider.clone(),
            body: raw.clone(),
        };
        let parsed: ChatCompletionResponse = serde_json::from_str(&raw).map_err(|_| invalid())?;
        parsed
            .first_content()
            .map(str::to_string)
            .ok_or_else(invalid)
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn chat(&self, exchange: ChatExchange) -> ApiResult<String> {
        if self.config.api_key.trim().is_empty() {
            return Err(ApiError::MissingCredential);
        }

        let temperature = exchange
            .temperature
            .unwrap_or(self.config.default_temperature);
        let body = ChatCompletionRequest::from_exchange(&self.config.model, &exchange, temperature);

        let mut failures = 0;
        loop {
            let start = Instant::now();

            match self.execute_request(&body).await {
                Ok(text) => {
                    info!(
                        provider = %self.config.provider,
                        model = %self.config.model,
                        latency_ms = start.elapsed().as_millis(),
                        "Chat completion succeeded"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    failures += 1;
                    error!(
                        provider = %self.config.provider,
                        error = %e,
                        latency_ms = start.elapsed().as_millis(),
                        attempt = failures,
                        "Chat completion failed"
                    );

                    let Some(delay) = self.retry_policy.next_delay(failures, &e) else {
                        return Err(e);
                    };
                    warn!(
                        provider = %self.config.provider,
                        retry = failures,
                        delay_ms = delay.as_millis(),
                        "Retrying chat completion"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
