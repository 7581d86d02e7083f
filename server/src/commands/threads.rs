// Thread Commands
//
// 服务端持有的会话线程：创建、列出、切换、重命名、发送消息

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::infrastructure::AppState;
use crate::modules::chat::{
    ChatTurn, GetThreadQuery, ListThreadsQuery, ListThreadsResponse, RenameThreadCommand,
    SendMessageCommand, SwitchThreadCommand, ThreadId, ThreadView,
};

#[derive(Debug, Deserialize)]
pub struct ListThreadsParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RenameThreadRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub selected_models: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_turn: ChatTurn,
    pub assistant_turn: ChatTurn,
    pub thread: ThreadView,
}

#[derive(Debug, Serialize)]
pub struct ActiveThreadResponse {
    pub thread: Option<ThreadView>,
}

fn parse_thread_id(raw: &str) -> Result<ThreadId, ApiError> {
    ThreadId::parse(raw).map_err(|_| ApiError::BadRequest(format!("Invalid thread id: {}", raw)))
}

/// 创建线程并设为活动线程
pub async fn create_thread(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ThreadView>), ApiError> {
    let thread = state.chat.create_thread().await?.thread;
    Ok((StatusCode::CREATED, Json(ThreadView::new(thread, Utc::now()))))
}

/// 列出线程，最近活动在前
pub async fn list_threads(
    State(state): State<AppState>,
    Query(params): Query<ListThreadsParams>,
) -> Result<Json<ListThreadsResponse>, ApiError> {
    let query = match (params.page, params.limit) {
        (None, None) => ListThreadsQuery::default(),
        (page, limit) => ListThreadsQuery::new(page.unwrap_or(1), limit.unwrap_or(50).clamp(1, 200)),
    };
    Ok(Json(state.chat.list_threads(query).await?))
}

pub async fn active_thread(
    State(state): State<AppState>,
) -> Result<Json<ActiveThreadResponse>, ApiError> {
    let now = Utc::now();
    let thread = state
        .chat
        .active_thread()
        .await?
        .thread
        .map(|t| ThreadView::new(t, now));
    Ok(Json(ActiveThreadResponse { thread }))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ThreadView>, ApiError> {
    let thread_id = parse_thread_id(&id)?;
    let Some(thread) = state
        .chat
        .get_thread(GetThreadQuery::new(thread_id))
        .await?
        .thread
    else {
        return Err(ApiError::ThreadNotFound(id));
    };
    Ok(Json(ThreadView::new(thread, Utc::now())))
}

/// 手动重命名，之后不再自动生成标题
pub async fn rename_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RenameThreadRequest>, JsonRejection>,
) -> Result<Json<ThreadView>, ApiError> {
    let thread_id = parse_thread_id(&id)?;
    let Json(request) = payload?;
    let thread = state
        .chat
        .rename_thread(RenameThreadCommand::new(thread_id, request.title))
        .await?
        .thread;
    Ok(Json(ThreadView::new(thread, Utc::now())))
}

pub async fn activate_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ThreadView>, ApiError> {
    let thread_id = parse_thread_id(&id)?;
    let thread = state
        .chat
        .switch_thread(SwitchThreadCommand::new(thread_id))
        .await?
        .thread;
    Ok(Json(ThreadView::new(thread, Utc::now())))
}

/// 发送消息：追加用户轮次、并发调用模型、追加助手轮次
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let thread_id = parse_thread_id(&id)?;
    let Json(request) = payload?;
    let sent = state
        .chat
        .send_message(SendMessageCommand::new(
            thread_id,
            request.content,
            request.selected_models,
        ))
        .await?;

    Ok(Json(SendMessageResponse {
        user_turn: sent.user_turn,
        assistant_turn: sent.assistant_turn,
        thread: ThreadView::new(sent.thread, Utc::now()),
    }))
}
