//! AgentSpec 与 TaskSpec：每次请求新建的不可变描述

/// Agent 描述：人设（role / goal / backstory）、可用工具名、是否允许委派
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// 允许调用的工具名（须已在 ToolRegistry 中注册）
    pub tools: Vec<String>,
    pub allow_delegation: bool,
}

impl AgentSpec {
    pub fn allows_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t == name)
    }
}

/// Task 描述：指令、期望输出、输出文件
///
/// `output_file` 为空字符串表示不写文件；类型上不存在「缺失」这一状态。
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
    pub output_file: String,
}

impl TaskSpec {
    pub fn output_path(&self) -> Option<&str> {
        let path = self.output_file.trim();
        (!path.is_empty()).then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_empty_means_none() {
        let mut task = TaskSpec {
            description: "d".into(),
            expected_output: "e".into(),
            output_file: String::new(),
        };
        assert_eq!(task.output_path(), None);
        task.output_file = "  ".into();
        assert_eq!(task.output_path(), None);
        task.output_file = "answer.md".into();
        assert_eq!(task.output_path(), Some("answer.md"));
    }

    #[test]
    fn test_allows_tool() {
        let agent = AgentSpec {
            role: "r".into(),
            goal: "g".into(),
            backstory: "b".into(),
            tools: vec!["search".into()],
            allow_delegation: false,
        };
        assert!(agent.allows_tool("search"));
        assert!(!agent.allows_tool("delegate"));
    }
}
