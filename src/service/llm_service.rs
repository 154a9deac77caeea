use async_trait::async_trait;

use crate::clients::anthropic_client::{self, ChatCompletion, ChatMessage};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatCompletion, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct AnthropicService {
    api_key: String,
}

impl AnthropicService {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl LlmClient for AnthropicService {
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatCompletion, Box<dyn std::error::Error + Send + Sync>> {
        anthropic_client::complete_messages(system, messages, &self.api_key).await
    }
}
