//! OpenAI chat completions client.
//!
//! Generation always runs at temperature 0 so a question asked twice against
//! the same context gets the same wording back.

use async_trait::async_trait;
use docqa_core::{LanguageModel, LlmError, TokenStream};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::sse::SseParser;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Chat model backed by the OpenAI chat completions API.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChat {
    /// Create a client for the default model (`gpt-4o`).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (for proxies and test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_request(
        &self,
        prompt: &str,
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            stream,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider(format!("chat request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(LlmError::Provider(format!(
                "chat API returned {status}: {text}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("completing prompt with {}", self.model);

        let response = self.send_request(prompt, false).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("malformed chat response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Provider("chat response had no choices".to_string()))
    }

    async fn complete_stream(&self, prompt: &str) -> Result<TokenStream, LlmError> {
        debug!("streaming prompt with {}", self.model);

        let response = self.send_request(prompt, true).await?;
        let mut byte_stream = response.bytes_stream();

        let (tx, rx) = mpsc::channel::<Result<String, LlmError>>(32);
        tokio::spawn(async move {
            let mut parser = SseParser::new();
            while let Some(item) = byte_stream.next().await {
                let bytes = match item {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(Err(LlmError::Stream(format!("stream read failed: {e}"))))
                            .await;
                        return;
                    }
                };

                match parser.push(&bytes) {
                    Ok(push) => {
                        for token in push.tokens {
                            // A dropped receiver means the consumer went away
                            if tx.send(Ok(token)).await.is_err() {
                                return;
                            }
                        }
                        if push.done {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx).boxed())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}
