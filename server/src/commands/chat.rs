// Chat Commands
//
// 无状态的多模型调用入口：接收完整对话，返回每个模型的结果

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiError;
use crate::infrastructure::AppState;
use crate::modules::chat::{validate_selection, ChatMessage, ModelInfo, ModelResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatRequest {
    #[serde(default)]
    pub selected_models: Vec<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct AiChatResponse {
    pub responses: Vec<ModelResult>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// 调用所选模型并等待全部完成
pub async fn ai_chat(
    State(state): State<AppState>,
    payload: Result<Json<AiChatRequest>, JsonRejection>,
) -> Result<Json<AiChatResponse>, ApiError> {
    let Json(request) = payload?;

    info!(
        models = request.selected_models.len(),
        messages = request.messages.len(),
        "AI chat request"
    );

    validate_selection(&request.selected_models)?;
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one message is required".to_string(),
        ));
    }

    let responses = state
        .chat
        .aggregate(&request.selected_models, &request.messages)
        .await?;

    Ok(Json(AiChatResponse { responses }))
}

/// 模型路由表
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.chat.list_models(),
    })
}
