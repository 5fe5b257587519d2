//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：complete（非流式）返回回复文本与本次调用的 token 消耗。
//! 客户端本身不累计用量；由调用方（Crew）按自己的调用求和，多个请求共享同一客户端时互不干扰。

use std::ops::AddAssign;

use async_trait::async_trait;

use crate::llm::Message;

/// 单次调用消耗的 token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// 一次完成：首条回复文本 + 本次 token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, String>;
}
