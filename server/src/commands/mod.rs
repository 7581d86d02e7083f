// HTTP Commands - 传输边界
//
// 提供商密钥只在服务端使用，客户端只能看到每个模型的结果

pub mod chat;
pub mod error;
pub mod threads;

pub use error::ApiError;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::infrastructure::AppState;

const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/models", get(chat::list_models))
        .route("/functions/v1/ai-chat", post(chat::ai_chat))
        .route("/api/ai-chat", post(chat::ai_chat))
        .route(
            "/api/threads",
            post(threads::create_thread).get(threads::list_threads),
        )
        .route("/api/threads/active", get(threads::active_thread))
        .route(
            "/api/threads/{id}",
            get(threads::get_thread).patch(threads::rename_thread),
        )
        .route("/api/threads/{id}/activate", post(threads::activate_thread))
        .route("/api/threads/{id}/messages", post(threads::send_message))
        .fallback(not_found)
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// 跨域处理：预检请求直接返回，其余响应附加 CORS 头
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        (StatusCode::OK, Body::empty()).into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PATCH, OPTIONS"),
    );
    response
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
