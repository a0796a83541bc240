use std::time::Duration;

use async_trait::async_trait;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequestArgs,
    },
    Client,
};

use crate::error::{CareTrackError, Result};
use crate::interfaces::providers::LlmProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.9;

/// Chat-completion client for any OpenAI-compatible endpoint. The default
/// base URL points at DeepSeek; a plain OpenAI key works by overriding the
/// base and model.
#[derive(Clone)]
pub struct OpenAiProvider {
    model: String,
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| "deepseek-chat".to_string());
        let base_url = base_url.unwrap_or_else(|| "https://api.deepseek.com/v1".to_string());
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            model,
            client: Client::with_config(config).with_http_client(http_client),
        }
    }

    fn build_system_message(system_prompt: &str) -> Result<Option<ChatCompletionRequestMessage>> {
        if system_prompt.is_empty() {
            return Ok(None);
        }
        let message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| CareTrackError::Runtime(e.to_string()))?;
        Ok(Some(ChatCompletionRequestMessage::System(message)))
    }

    fn build_user_message(prompt: &str) -> Result<ChatCompletionRequestMessage> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                prompt.to_string(),
            ))
            .build()
            .map_err(|e| CareTrackError::Runtime(e.to_string()))?;
        Ok(ChatCompletionRequestMessage::User(message))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate_text(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = Self::build_system_message(system_prompt)? {
            messages.push(system);
        }
        messages.push(Self::build_user_message(prompt)?);

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .max_tokens(MAX_TOKENS)
            .temperature(TEMPERATURE)
            .top_p(TOP_P)
            .build()
            .map_err(|e| CareTrackError::Runtime(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CareTrackError::ExternalService(e.to_string()))?;

        let text = response
            .choices
            .first()
            .ok_or_else(|| CareTrackError::ExternalService("No choices returned".to_string()))?
            .message
            .content
            .clone()
            .unwrap_or_default();
        Ok(text)
    }
}
