//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按顺序返回预设回复，并记录每次调用收到的消息，便于断言 Crew 拼出的 prompt。
//! 每次成功调用报告固定用量（prompt 10 / completion 5）。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{Completion, LlmClient, Message, TokenUsage};

/// 每次成功调用报告的用量
pub const MOCK_CALL_USAGE: TokenUsage = TokenUsage {
    prompt_tokens: 10,
    completion_tokens: 5,
};

/// Mock 客户端：依次弹出脚本中的回复；脚本耗尽时返回错误
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以若干成功回复构建
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::default();
        for r in replies {
            mock.push_reply(r);
        }
        mock
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Ok(reply.into()));
        }
    }

    pub fn push_error(&self, error: impl Into<String>) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Err(error.into()));
        }
    }

    /// 已收到的调用（每次调用的完整消息列表）
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        let content = self
            .replies
            .lock()
            .map_err(|e| e.to_string())?
            .pop_front()
            .unwrap_or_else(|| Err("mock: no scripted reply left".to_string()))?;
        Ok(Completion {
            content,
            usage: MOCK_CALL_USAGE,
        })
    }
}
