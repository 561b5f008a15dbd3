use bill_extract::api::{self, AppState, HistoryStore};
use bill_extract::{AppConfig, ExtractionService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!(
        "Starting server: mode={:?}, max_concurrency={}, dpi={}",
        config.extraction.mode, config.extraction.max_concurrency, config.extraction.dpi
    );

    // 创建抽取服务
    let service = Arc::new(ExtractionService::from_config(&config)?);
    let state = AppState {
        service,
        history: Arc::new(HistoryStore::new(config.server.history_limit)),
        url_fields: Arc::new(config.input.url_fields.clone()),
    };

    let app = api::router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /extract-bill-data - extract line items from a bill URL");
    info!("  GET  /history           - recent extraction requests");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
