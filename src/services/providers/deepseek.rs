/// DeepSeek chat completion provider
///
/// DeepSeek exposes an OpenAI-compatible API, so this provider works against
/// any `/chat/completions` endpoint that accepts bearer auth. The base URL and
/// model come from configuration.
use crate::{
    error::{AppError, AppResult, QUOTA_EXCEEDED_MESSAGE},
    services::providers::{CompletionProvider, CompletionRequest},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, empty when the model returned none
    fn into_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct DeepSeekProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl DeepSeekProvider {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Maps an unsuccessful upstream status to our error taxonomy
    fn error_for_status(status: StatusCode, body: &str) -> AppError {
        if status == StatusCode::PAYMENT_REQUIRED {
            return AppError::QuotaExceeded(QUOTA_EXCEEDED_MESSAGE.to_string());
        }

        AppError::ExternalApi(format!(
            "Chat completion API returned status {}: {}",
            status, body
        ))
    }
}

#[async_trait::async_trait]
impl CompletionProvider for DeepSeekProvider {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_for_status(status, &body));
        }

        let response_text = response.text().await?;
        tracing::debug!(response = %response_text, "Raw chat completion response");

        let completion: ChatCompletionResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                tracing::error!(
                    error = %e,
                    response = %response_text,
                    "Failed to deserialize chat completion response"
                );
                AppError::ExternalApi(format!("Failed to parse chat completion response: {}", e))
            })?;

        let content = completion.into_content();

        tracing::info!(
            model = %self.model,
            content_length = content.len(),
            provider = "deepseek",
            "Chat completion finished"
        );

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "deepseek"
    }
}
