use crate::error::ExtractError;
use crate::external::{OcrEngine, Rasterizer, VisionExtractor};
use crate::models::{BillItem, PageResult, PageStatus, PageType, ParsedItem, TokenUsage, TotalsMap, WordBox};
use crate::parser;
use crate::service::normalize::{normalize_items, normalize_parsed};
use crate::service::retry::RetryPolicy;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// 页面来源: 直接提供的图片, 或 PDF 中的某一页
#[derive(Debug, Clone)]
pub enum PageSource {
    Image(PathBuf),
    Pdf(PathBuf),
}

/// 单页任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Pending,
    Acquiring,
    Extracting,
    Normalizing,
    Succeeded,
    Failed,
}

/// 抽取路径及其依赖
#[derive(Clone)]
pub enum PageExtractor {
    Ocr {
        engine: Arc<dyn OcrEngine>,
        y_tolerance: f64,
        debug_dir: Option<PathBuf>,
    },
    Vision {
        extractor: Arc<dyn VisionExtractor>,
        retry: RetryPolicy,
    },
}

impl std::fmt::Debug for PageExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ocr { y_tolerance, .. } => f.debug_struct("Ocr").field("y_tolerance", y_tolerance).finish(),
            Self::Vision { retry, .. } => f.debug_struct("Vision").field("retry", retry).finish(),
        }
    }
}

/// 页任务共享的只读上下文
#[derive(Clone)]
pub struct PageContext {
    pub rasterizer: Arc<dyn Rasterizer>,
    pub extractor: PageExtractor,
}

enum RawItems {
    Parsed(Vec<ParsedItem>),
    Json(Vec<Value>),
}

/// 抽取阶段产出, 尚未规范化
struct RawPage {
    page_type: PageType,
    items: RawItems,
    usage: TokenUsage,
    totals: TotalsMap,
}

/// 单页抽取任务
#[derive(Debug, Clone)]
pub struct PageTask {
    page_no: u32,
    source: PageSource,
}

impl PageTask {
    pub fn new(page_no: u32, source: PageSource) -> Self {
        Self { page_no, source }
    }

    pub fn page_no(&self) -> u32 {
        self.page_no
    }

    fn transition(&self, state: PageState) {
        tracing::debug!("Page {} -> {:?}", self.page_no, state);
    }

    /// 执行任务; 任何失败都折叠为失败页, 不向上传播
    pub async fn run(&self, ctx: &PageContext) -> PageResult {
        self.transition(PageState::Pending);
        match self.execute(ctx).await {
            Ok(result) => {
                self.transition(PageState::Succeeded);
                tracing::info!(
                    "Page {} extracted {} items ({})",
                    self.page_no,
                    result.bill_items.len(),
                    result.page_type.as_str()
                );
                result
            }
            Err(e) => {
                self.transition(PageState::Failed);
                tracing::warn!("Page {} extraction failed: {}", self.page_no, e);
                PageResult::failed(self.page_no)
            }
        }
    }

    async fn execute(&self, ctx: &PageContext) -> Result<PageResult, ExtractError> {
        // 1. 获取页面图片; 渲染产物放在任务私有的临时目录, 离开作用域即删除
        self.transition(PageState::Acquiring);
        let mut scratch: Option<TempDir> = None;
        let image = match &self.source {
            PageSource::Image(path) => path.clone(),
            PageSource::Pdf(pdf) => {
                let dir = tempfile::Builder::new()
                    .prefix(&format!("bill-page-{}-", self.page_no))
                    .tempdir()?;
                let image = ctx.rasterizer.rasterize(pdf, self.page_no, dir.path()).await?;
                scratch = Some(dir);
                image
            }
        };

        // 2. 抽取
        self.transition(PageState::Extracting);
        let raw = self.extract(&ctx.extractor, &image).await?;

        // 3. 规范化
        self.transition(PageState::Normalizing);
        let bill_items: Vec<BillItem> = match raw.items {
            RawItems::Parsed(items) => normalize_parsed(items),
            RawItems::Json(items) => normalize_items(&items),
        };

        drop(scratch);
        Ok(PageResult {
            page_no: self.page_no.to_string(),
            page_type: raw.page_type,
            bill_items,
            token_usage: raw.usage,
            extraction_status: PageStatus::Succeeded,
            detected_totals: raw.totals,
        })
    }

    async fn extract(&self, extractor: &PageExtractor, image: &Path) -> Result<RawPage, ExtractError> {
        match extractor {
            PageExtractor::Ocr {
                engine,
                y_tolerance,
                debug_dir,
            } => {
                let words = engine.recognize(image).await?;
                if let Some(dir) = debug_dir {
                    self.dump_words(dir, &words).await;
                }
                let page = parser::parse_page(&words, *y_tolerance);
                Ok(RawPage {
                    page_type: page.page_type,
                    items: RawItems::Parsed(page.items),
                    usage: TokenUsage::default(),
                    totals: page.totals,
                })
            }
            PageExtractor::Vision { extractor, retry } => {
                let output = retry.run(self.page_no, move || extractor.extract(image)).await?;
                Ok(RawPage {
                    page_type: PageType::from_label(&output.page_type),
                    items: RawItems::Json(output.items),
                    usage: output.usage,
                    totals: TotalsMap::new(),
                })
            }
        }
    }

    /// 写出本页 OCR 单词, 失败只记录日志
    async fn dump_words(&self, dir: &Path, words: &[WordBox]) {
        let path = dir.join(format!("page_{}.json", self.page_no));
        let written = match serde_json::to_vec_pretty(words) {
            Ok(bytes) => match tokio::fs::create_dir_all(dir).await {
                Ok(()) => tokio::fs::write(&path, bytes).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e.into()),
        };
        if let Err(e) = written {
            tracing::warn!("Failed to write OCR dump {}: {}", path.display(), e);
        }
    }
}
