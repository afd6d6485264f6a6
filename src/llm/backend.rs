//! HTTP client for the co-browsing backend
//!
//! POSTs `{message, page_content, history}` to `/chat` and unwraps the
//! `{"response": ...}` envelope. One attempt per call.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::core::config::BackendConfig;
use crate::core::{ChatReply, ChatRequest, ChatResponse, CobrowseError, Result};
use crate::llm::reply::reply_from_value;
use crate::llm::traits::ReasoningClient;

/// Backend API client
#[derive(Clone)]
pub struct HttpReasoningClient {
    client: Client,
    chat_url: String,
    health_url: String,
}

impl HttpReasoningClient {
    /// Create a client from configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CobrowseError::with_context("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            health_url: config.health_url(),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[async_trait]
impl ReasoningClient for HttpReasoningClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        debug!(
            url = %self.chat_url,
            page_chars = request.page_content.chars().count(),
            history = request.history.len(),
            "Sending chat turn"
        );

        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CobrowseError::backend(format!(
                        "Cannot connect to backend at {}. Is it running?",
                        self.chat_url
                    ))
                } else {
                    CobrowseError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CobrowseError::backend(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let envelope: ChatResponse = response.json().await?;
        Ok(reply_from_value(envelope.response))
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(&self.health_url)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "http"
    }
}
