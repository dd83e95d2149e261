use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;

use super::{MessagesRequest, MessagesResponse, Provider};
use crate::error::ResearchError;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Host name reported as `server.address` on LLM spans.
    pub fn server_address(&self) -> String {
        reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.base_url.clone())
    }

    fn headers(&self) -> Result<HeaderMap, ResearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|e| ResearchError::Service {
                status: None,
                message: format!("invalid API key header: {e}"),
            })?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[derive(Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<AnthropicError>(body) {
        Ok(err) => err.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.to_string(),
    }
}

#[async_trait::async_trait]
impl Provider for AnthropicProvider {
    async fn create_message(&self, req: &MessagesRequest) -> Result<MessagesResponse, ResearchError> {
        let response = self
            .client
            .post(self.messages_url())
            .headers(self.headers()?)
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ResearchError::Service {
                status: Some(status.as_u16()),
                message: error_message(&error_body),
            });
        }

        let body = response.bytes().await?;
        Ok(MessagesResponse::from_body(&body))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
