use crate::config::{AppConfig, ExtractionMode};
use crate::error::ExtractError;
use crate::external::{
    AcquiredDocument, DocumentFetcher, DocumentKind, HttpFetcher, OpenAiVision, PopplerRasterizer, Rasterizer,
    TesseractOcr,
};
use crate::models::DocumentResult;
use crate::service::aggregator::aggregate;
use crate::service::orchestrator::PageOrchestrator;
use crate::service::page_task::{PageContext, PageExtractor, PageSource};
use crate::service::retry::RetryPolicy;
use std::sync::Arc;

/// 文档级抽取服务: 下载 -> 分页 -> 并发抽取 -> 汇总
pub struct ExtractionService {
    fetcher: Arc<dyn DocumentFetcher>,
    rasterizer: Arc<dyn Rasterizer>,
    orchestrator: PageOrchestrator,
}

impl ExtractionService {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        rasterizer: Arc<dyn Rasterizer>,
        extractor: PageExtractor,
        max_concurrency: usize,
    ) -> Self {
        let ctx = PageContext {
            rasterizer: Arc::clone(&rasterizer),
            extractor,
        };
        Self {
            fetcher,
            rasterizer,
            orchestrator: PageOrchestrator::new(ctx, max_concurrency),
        }
    }

    /// 按配置组装真实的协作者
    pub fn from_config(config: &AppConfig) -> Result<Self, ExtractError> {
        let fetcher = Arc::new(HttpFetcher::new(config.fetch.timeout())?);
        let rasterizer = Arc::new(PopplerRasterizer::new(config.extraction.dpi));

        let extractor = match config.extraction.mode {
            ExtractionMode::Ocr => PageExtractor::Ocr {
                engine: Arc::new(TesseractOcr::new(config.extraction.ocr_lang.as_str())),
                y_tolerance: config.extraction.y_tolerance,
                debug_dir: config.extraction.debug_dir.clone(),
            },
            ExtractionMode::Vision => {
                if config.vision.api_key.is_empty() {
                    tracing::warn!("Vision mode enabled without an API key; requests will be rejected upstream");
                }
                let vision = OpenAiVision::new(&config.vision)?;
                tracing::info!("Vision extraction using model {}", vision.model());
                PageExtractor::Vision {
                    extractor: Arc::new(vision),
                    retry: RetryPolicy::from(&config.retry),
                }
            }
        };

        Ok(Self::new(
            fetcher,
            rasterizer,
            extractor,
            config.extraction.max_concurrency,
        ))
    }

    /// 下载并抽取; 只有文档级错误才返回 Err
    pub async fn extract_from_url(&self, url: &str) -> Result<DocumentResult, ExtractError> {
        tracing::info!("Processing document {}", url);
        let document = self.fetcher.fetch(url).await?;
        // document 在此函数结束时 drop, 临时文件随之删除
        self.extract_document(&document).await
    }

    pub async fn extract_document(&self, document: &AcquiredDocument) -> Result<DocumentResult, ExtractError> {
        let path = document.path().to_path_buf();
        let (source, page_count) = match document.kind {
            DocumentKind::Image => (PageSource::Image(path), 1),
            DocumentKind::Pdf => {
                let count = self.rasterizer.page_count(&path).await?;
                (PageSource::Pdf(path), count)
            }
        };

        let pages = self.orchestrator.run(source, page_count).await;
        let result = aggregate(pages);

        tracing::info!(
            "Document done: {} page(s), {} items, {} tokens",
            result.pagewise_line_items.len(),
            result.total_item_count,
            result.token_usage.total_tokens
        );
        Ok(result)
    }
}

impl std::fmt::Debug for ExtractionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionService")
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}
