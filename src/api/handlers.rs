use crate::api::history::{HistoryEntry, HistoryStore};
use crate::api::input::find_document_url;
use crate::models::{DocumentResult, PageResult, TokenUsage};
use crate::service::ExtractionService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// 共享状态
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<ExtractionService>,
    pub history: Arc<HistoryStore>,
    pub url_fields: Arc<Vec<String>>,
}

/// 响应体中的 data 部分
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractData {
    pub pagewise_line_items: Vec<PageResult>,
    pub total_item_count: usize,
}

/// 响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub is_success: bool,
    pub token_usage: TokenUsage,
    pub data: ExtractData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractResponse {
    pub fn failure(message: String) -> Self {
        Self {
            is_success: false,
            token_usage: TokenUsage::default(),
            data: ExtractData {
                pagewise_line_items: Vec::new(),
                total_item_count: 0,
            },
            error: Some(message),
        }
    }
}

impl From<DocumentResult> for ExtractResponse {
    fn from(result: DocumentResult) -> Self {
        Self {
            is_success: result.is_success,
            token_usage: result.token_usage,
            data: ExtractData {
                pagewise_line_items: result.pagewise_line_items,
                total_item_count: result.total_item_count,
            },
            error: None,
        }
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 最近的抽取记录
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.recent())
}

/// 账单明细抽取接口
pub async fn extract_bill_data(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let requested_at = Utc::now();
    let url = find_document_url(&body, &state.url_fields);

    let response = match url.as_deref() {
        None => {
            tracing::warn!("No document URL found in request body");
            ExtractResponse::failure("no document URL found in request".to_string())
        }
        Some(url) => match state.service.extract_from_url(url).await {
            Ok(result) => ExtractResponse::from(result),
            Err(e) => {
                tracing::error!("Extraction of {} failed: {}", url, e);
                ExtractResponse::failure(e.to_string())
            }
        },
    };

    state.history.record(HistoryEntry {
        url,
        requested_at,
        is_success: response.is_success,
        page_count: response.data.pagewise_line_items.len(),
        total_item_count: response.data.total_item_count,
        error: response.error.clone(),
    });

    (StatusCode::OK, Json(response)).into_response()
}
