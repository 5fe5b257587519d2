//! Crew：单 Agent、单 Task 的执行
//!
//! Plan -> (Tool -> Observe)* -> Final Answer；步数受 max_steps 限制。
//! 仅允许调用 AgentSpec.tools 中列出的工具，每次调用有超时并输出一行 tool_audit（JSON，带 query_id）；
//! 工具失败或超时作为 Observation 交回模型，不终止任务。
//! token 用量只累加本 Crew 自己的 LLM 调用。最终回答写入 TaskOutput，
//! 若 TaskSpec.output_file 非空则同时写入该文件。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::core::AgentError;
use crate::crew::output::{CrewOutput, TaskOutput};
use crate::crew::planner::{parse_llm_output, Planner, PlannerOutput, ToolCall};
use crate::crew::spec::{AgentSpec, TaskSpec};
use crate::llm::{LlmClient, Message, TokenUsage};
use crate::tools::ToolRegistry;

/// 日志中 Observation / 参数预览的最大字符数
const PREVIEW_CHARS: usize = 200;

/// 单次执行的上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrewLimits {
    pub max_steps: usize,
    pub tool_timeout: Duration,
}

impl CrewLimits {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            max_steps: cfg.llm.max_steps,
            tool_timeout: Duration::from_secs(cfg.tools.tool_timeout_secs),
        }
    }
}

pub struct Crew<'a> {
    agent: AgentSpec,
    task: TaskSpec,
    planner: Planner,
    tools: &'a ToolRegistry,
    limits: CrewLimits,
    query_id: Uuid,
}

impl<'a> Crew<'a> {
    pub fn new(
        agent: AgentSpec,
        task: TaskSpec,
        llm: Arc<dyn LlmClient>,
        tools: &'a ToolRegistry,
        limits: CrewLimits,
    ) -> Self {
        let system_prompt = agent_system_prompt(&agent, tools);
        Self {
            planner: Planner::new(llm, system_prompt),
            agent,
            task,
            tools,
            limits,
            query_id: Uuid::new_v4(),
        }
    }

    /// 使用调用方的查询 id（日志与审计行据此关联）
    pub fn with_query_id(mut self, query_id: Uuid) -> Self {
        self.query_id = query_id;
        self
    }

    pub fn system_prompt(&self) -> &str {
        self.planner.system_prompt()
    }

    /// 执行任务直到得到最终回答
    pub async fn kickoff(&self) -> Result<CrewOutput, AgentError> {
        let mut usage = TokenUsage::default();
        let mut messages = vec![Message::user(task_prompt(&self.task))];

        for step in 0..self.limits.max_steps {
            let completion = self.planner.plan(&messages).await?;
            usage += completion.usage;
            let output = completion.content;

            match parse_llm_output(&output) {
                Ok(PlannerOutput::Response(answer)) => {
                    tracing::info!(
                        query_id = %self.query_id,
                        step,
                        role = %self.agent.role,
                        "agent produced final answer"
                    );
                    if let Some(path) = self.task.output_path() {
                        write_output_file(path, &answer).await?;
                    }
                    return Ok(CrewOutput {
                        raw: answer.clone(),
                        tasks_output: vec![TaskOutput {
                            description: self.task.description.clone(),
                            expected_output: self.task.expected_output.clone(),
                            agent: self.agent.role.clone(),
                            raw: answer,
                        }],
                        token_usage: usage.into(),
                    });
                }
                Ok(PlannerOutput::ToolCall(call)) => {
                    let observation = self.use_tool(step, &call).await?;
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(format!(
                        "Observation from {}: {}",
                        call.tool, observation
                    )));
                }
                Err(e) => {
                    tracing::warn!(
                        query_id = %self.query_id,
                        step,
                        error = %e,
                        "unparseable reply, asking agent to retry"
                    );
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(format!(
                        "Your last reply could not be parsed ({e}). To use a tool reply with ONLY one JSON object \
                         like {{\"tool\": \"search\", \"args\": {{\"query\": \"...\"}}}}. \
                         Otherwise reply with your final answer prefixed by \"Final Answer:\"."
                    )));
                }
            }
        }

        Err(AgentError::MaxStepsExceeded(self.limits.max_steps))
    }

    /// 调用已绑定的工具，返回交给模型的 Observation
    ///
    /// 未绑定的工具是错误（HallucinatedTool）；工具失败或超时转成 "Error: ..." 文本。
    async fn use_tool(&self, step: usize, call: &ToolCall) -> Result<String, AgentError> {
        if !self.agent.allows_tool(&call.tool) {
            tracing::warn!(
                query_id = %self.query_id,
                tool = %call.tool,
                "agent requested a tool it is not bound to"
            );
            return Err(AgentError::HallucinatedTool(call.tool.clone()));
        }

        let start = Instant::now();
        let result = timeout(
            self.limits.tool_timeout,
            self.tools.execute(&call.tool, call.args.clone()),
        )
        .await;

        let (outcome, observation) = match result {
            Ok(Ok(text)) => ("ok", text),
            Ok(Err(e)) => ("error", format!("Error: {}", AgentError::ToolExecutionFailed(e))),
            Err(_) => (
                "timeout",
                format!("Error: {}", AgentError::ToolTimeout(call.tool.clone())),
            ),
        };

        let audit = serde_json::json!({
            "event": "tool_audit",
            "query_id": self.query_id.to_string(),
            "agent": self.agent.role,
            "step": step,
            "tool": call.tool,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": preview(&call.args.to_string()),
            "observation_chars": observation.chars().count(),
        });
        tracing::info!(audit = %audit, "tool");
        tracing::debug!(
            query_id = %self.query_id,
            step,
            preview = %preview(&observation),
            "observation"
        );

        Ok(observation)
    }
}

/// Agent 的 system prompt：人设 + 可用工具 + 回复格式
fn agent_system_prompt(agent: &AgentSpec, tools: &ToolRegistry) -> String {
    let tools = tools.describe(&agent.tools);
    let tools_block = if tools.is_empty() {
        "You have no tools available; answer from your own knowledge.".to_string()
    } else {
        format!(
            "You ONLY have access to the following tools, and should NEVER make up tools that are not listed here:\n{tools}"
        )
    };
    let delegation = if agent.allow_delegation {
        ""
    } else {
        "\nYou work on the task yourself; you cannot delegate it to anyone else."
    };
    format!(
        "You are {role}.\n{backstory}\n\nYour personal goal is: {goal}{delegation}\n\n{tools_block}\n\n\
         To use a tool, reply with ONLY a JSON object: {{\"tool\": \"<tool name>\", \"args\": {{...}}}}\n\
         When you have enough information, reply with your complete answer prefixed by \"Final Answer:\".",
        role = agent.role,
        backstory = agent.backstory,
        goal = agent.goal,
    )
}

fn task_prompt(task: &TaskSpec) -> String {
    format!(
        "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        task.description, task.expected_output
    )
}

async fn write_output_file(path: &str, content: &str) -> Result<(), AgentError> {
    let to_err = |source| AgentError::OutputFile {
        path: path.to_string(),
        source,
    };
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(to_err)?;
        }
    }
    tokio::fs::write(path, content).await.map_err(to_err)
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}
