//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；模型、temperature、max_tokens 来自 [llm] 配置，
//! API Key 由调用方显式传入（见 config::Secrets）。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::config::LlmSection;
use crate::llm::{Completion, LlmClient, Message, Role, TokenUsage};

/// OpenAI 兼容客户端：持有 Client 与采样参数，complete 时转 Message 为 API 格式并取首条 content
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSection, api_key: &str) -> Self {
        let config = match settings.base_url.as_deref() {
            Some(url) => OpenAIConfig::new().with_api_base(url).with_api_key(api_key),
            None => OpenAIConfig::new().with_api_key(api_key),
        };

        Self {
            client: Client::with_config(config),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    fn to_openai_messages(
        &self,
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, String> {
        messages
            .iter()
            .map(|m| {
                let msg = match m.role {
                    Role::System => ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .map(ChatCompletionRequestMessage::System),
                    Role::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .map(ChatCompletionRequestMessage::User),
                    Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .map(ChatCompletionRequestMessage::Assistant),
                };
                msg.map_err(|e| e.to_string())
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .messages(self.to_openai_messages(messages)?)
            .build()
            .map_err(|e| e.to_string())?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| e.to_string())?;

        let usage = response
            .usage
            .as_ref()
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens as u64,
                completion_tokens: u.completion_tokens as u64,
            })
            .unwrap_or_default();

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(Completion { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_all_roles() {
        let client = OpenAiClient::new(&LlmSection::default(), "sk-test");
        let converted = client
            .to_openai_messages(&[
                Message::system("persona"),
                Message::user("question"),
                Message::assistant("answer"),
            ])
            .unwrap();
        assert_eq!(converted.len(), 3);
        assert!(matches!(converted[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(converted[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(converted[2], ChatCompletionRequestMessage::Assistant(_)));
    }
}
