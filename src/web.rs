//! Web UI：单页 + JSON API
//!
//! GET / 页面；GET /api/status 就绪状态与配置错误；POST /api/ask 提问；GET /api/health。
//! 密钥缺失时 components 为 None：/api/status 报告错误，页面禁用按钮，/api/ask 返回 503。

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::agent::{ask, AgentComponents, Status};
use crate::config::AppConfig;

pub struct WebState {
    pub config: AppConfig,
    pub components: Option<Arc<AgentComponents>>,
    /// 启动时的配置错误（如密钥缺失），原样展示给用户
    pub config_errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    status: Status,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    /// 原始结果，供「Raw CrewOutput」面板展示
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    ready: bool,
    title: String,
    default_question: String,
    config_errors: Vec<String>,
}

pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(api_status))
        .route("/api/ask", post(api_ask))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn api_status(State(state): State<Arc<WebState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ready: state.components.is_some(),
        title: state.config.app.name.clone(),
        default_question: state.config.web.default_question.clone(),
        config_errors: state.config_errors.clone(),
    })
}

/// POST /api/ask：执行一次查询；编排失败与无文本都以 200 返回，由 status 区分
async fn api_ask(State(state): State<Arc<WebState>>, Json(req): Json<AskRequest>) -> Response {
    let Some(components) = state.components.as_ref() else {
        let body = AskResponse {
            status: Status::Error,
            message: state.config_errors.join(" "),
            answer: None,
            raw: None,
        };
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    };

    let outcome = ask(components, &req.question).await;
    Json(AskResponse {
        status: outcome.status(),
        message: outcome.message().to_string(),
        answer: outcome.answer().map(str::to_string),
        raw: outcome.raw().map(|r| r.to_value()),
    })
    .into_response()
}
