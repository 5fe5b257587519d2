//! Search 工具：Serper（Google 搜索 API）
//!
//! POST {"q": query, "num": n} 到配置的端点，带 X-API-KEY；将 answerBox / knowledgeGraph / organic 结果
//! 整理为纯文本供 LLM 阅读，超过 max_result_chars 时截断并追加 ...[truncated]。

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SearchSection;
use crate::tools::Tool;

/// Serper 响应中用到的部分
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerperResponse {
    #[serde(default)]
    pub answer_box: Option<AnswerBox>,
    #[serde(default)]
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnswerBox {
    pub title: Option<String>,
    pub answer: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KnowledgeGraph {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// 将 Serper 响应整理为纯文本
pub fn format_results(resp: &SerperResponse, limit: usize) -> String {
    let mut sections = Vec::new();

    if let Some(ab) = &resp.answer_box {
        let body = ab.answer.as_deref().or(ab.snippet.as_deref()).unwrap_or("");
        if !body.trim().is_empty() {
            sections.push(format!(
                "Answer box: {}\n{}",
                ab.title.as_deref().unwrap_or(""),
                body.trim()
            ));
        }
    }

    if let Some(kg) = &resp.knowledge_graph {
        if let Some(desc) = kg.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let title = kg.title.as_deref().unwrap_or("");
            match kg.kind.as_deref() {
                Some(kind) => sections.push(format!("Knowledge graph: {title} ({kind})\n{desc}")),
                None => sections.push(format!("Knowledge graph: {title}\n{desc}")),
            }
        }
    }

    for r in resp.organic.iter().take(limit) {
        sections.push(format!(
            "Title: {}\nLink: {}\nSnippet: {}",
            r.title, r.link, r.snippet
        ));
    }

    if sections.is_empty() {
        return "No search results found.".to_string();
    }
    sections.join("\n---\n")
}

fn truncate_chars(body: String, max: usize) -> String {
    if body.chars().count() > max {
        body.chars().take(max).collect::<String>() + "\n...[truncated]"
    } else {
        body
    }
}

/// Search 工具：调用 Serper 搜索；超时与最大字符数由配置决定
pub struct SearchTool {
    client: Client,
    endpoint: String,
    api_key: String,
    num_results: usize,
    max_result_chars: usize,
}

impl SearchTool {
    pub fn new(settings: &SearchSection, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: api_key.into(),
            num_results: settings.num_results,
            max_result_chars: settings.max_result_chars,
        }
    }

    async fn search(&self, query: &str) -> Result<String, String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": self.num_results }))
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let body: SerperResponse = resp
            .json()
            .await
            .map_err(|e| format!("Read body: {}", e))?;

        Ok(truncate_chars(
            format_results(&body, self.num_results),
            self.max_result_chars,
        ))
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the internet with Google (via Serper) and return titles, links and snippets. Args: {\"query\": \"...\"}."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The search query" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let query = args
            .get("query")
            .or_else(|| args.get("search_query"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim();
        if query.is_empty() {
            return Err("Missing query".to_string());
        }
        tracing::info!(query = %query, "search tool query");
        self.search(query).await
    }
}
