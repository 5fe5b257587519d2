//! 神学助手的固定人设与任务模板

use crate::crew::{AgentSpec, TaskSpec};

/// 输入框默认问题
pub const DEFAULT_QUESTION: &str = "What does the Bible teach about justification by faith?";

pub const ROLE: &str = "Reformed Scholastic Theology Assistant";

pub const GOAL: &str = "Provide a scholarly, detailed theological response strictly from a classical Reformed scholastic perspective. \
Avoid modern evangelical websites. Use only magisterial confessions, classical Reformed scholastics, \
and classical resources (like PRDL) for references.";

pub const BACKSTORY: &str = "You are a Reformed scholastic theologian steeped in the works of Calvin, Turretin, Bavinck, Hodge, Warfield, \
Vos, and other classical Reformed sources, as well as classical scholasticism including Aquinas. You have access \
to Greek/Hebrew lexicons and can provide rigorous, historical, theological responses.";

pub const EXPECTED_OUTPUT: &str = "A magisterial, scholastic response from classical Reformed sources.";

/// 搜索工具名（须与 tools::SearchTool::name 一致）
pub const SEARCH_TOOL: &str = "search";

pub fn theology_agent() -> AgentSpec {
    AgentSpec {
        role: ROLE.to_string(),
        goal: GOAL.to_string(),
        backstory: BACKSTORY.to_string(),
        tools: vec![SEARCH_TOOL.to_string()],
        allow_delegation: false,
    }
}

/// 把用户问题嵌入固定指令模板
pub fn theology_task(question: &str, output_file: &str) -> TaskSpec {
    let description = format!(
        "Provide a comprehensive theological response to the following question:\n\n\
         '{question}'\n\n\
         Requirements:\n\
         - Strictly classical Reformed scholastic perspective.\n\
         - Include quotes from classical theologians (Calvin, Turretin, Bavinck, Hodge, Warfield).\n\
         - Provide Greek/Hebrew word translations and insights as relevant to the context; include them almost always.\n\
         - Provide references to classical and magisterial resources (e.g., PRDL).\n\
         - Avoid modern popular evangelical websites.\n"
    );
    TaskSpec {
        description,
        expected_output: EXPECTED_OUTPUT.to_string(),
        output_file: output_file.to_string(),
    }
}
