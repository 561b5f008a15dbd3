pub mod handlers;
pub mod history;
pub mod input;

pub use handlers::{extract_bill_data, health_check, list_history, AppState, ExtractResponse};
pub use history::{HistoryEntry, HistoryStore};
pub use input::find_document_url;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/history", get(list_history))
        .route("/extract-bill-data", post(extract_bill_data))
        .with_state(state)
        .layer(ServiceBuilder::new())
}
