#![allow(dead_code)]

use async_trait::async_trait;
use bill_extract::error::ExtractError;
use bill_extract::external::{AcquiredDocument, DocumentFetcher, DocumentKind, OcrEngine, Rasterizer};
use bill_extract::models::WordBox;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 返回固定格式的本地临时文件
pub struct FakeFetcher {
    pub kind: Option<DocumentKind>,
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<AcquiredDocument, ExtractError> {
        let Some(kind) = self.kind else {
            return Err(ExtractError::UnsupportedFormat(format!("text/html from {url}")));
        };
        Ok(AcquiredDocument {
            file: tempfile::NamedTempFile::new()?,
            kind,
        })
    }
}

/// 假渲染器: 指定页失败, 每页可设置延迟
pub struct FakeRasterizer {
    pub pages: u32,
    pub failing_page: Option<u32>,
    pub delays_ms: HashMap<u32, u64>,
}

impl FakeRasterizer {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            failing_page: None,
            delays_ms: HashMap::new(),
        }
    }
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn page_count(&self, _pdf: &Path) -> Result<u32, ExtractError> {
        if self.pages == 0 {
            return Err(ExtractError::Rasterization("corrupt pdf".to_string()));
        }
        Ok(self.pages)
    }

    async fn rasterize(&self, _pdf: &Path, page_no: u32, out_dir: &Path) -> Result<PathBuf, ExtractError> {
        if let Some(ms) = self.delays_ms.get(&page_no) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if self.failing_page == Some(page_no) {
            return Err(ExtractError::Rasterization(format!("page {page_no} cannot be rendered")));
        }
        Ok(out_dir.join(format!("page_{page_no}.png")))
    }
}

/// 假 OCR: 每页返回 `items_per_page` 条明细行, 并记录同时处于抽取阶段的任务数
pub struct FakeOcr {
    pub items_per_page: HashMap<u32, usize>,
    pub delay_ms: u64,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeOcr {
    pub fn new(items_per_page: HashMap<u32, usize>, delay_ms: u64) -> Self {
        Self {
            items_per_page,
            delay_ms,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

fn page_of(image: &Path) -> u32 {
    image
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix("page_"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

/// 生成 n 行 "Item k  qty  rate  amount"
pub fn bill_rows(page: u32, n: usize) -> Vec<WordBox> {
    (0..n)
        .flat_map(|row| {
            let top = 100 + row as i32 * 50;
            let amount = (row as i32 + 1) * 10 + page as i32;
            vec![
                WordBox::new(format!("Item-{page}-{row}"), 20, top, 120, 20),
                WordBox::new("1", 400, top, 10, 20),
                WordBox::new(amount.to_string(), 500, top, 30, 20),
                WordBox::new(amount.to_string(), 600, top, 30, 20),
            ]
        })
        .collect()
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(&self, image: &Path) -> Result<Vec<WordBox>, ExtractError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let page = page_of(image);
        let n = self.items_per_page.get(&page).copied().unwrap_or(0);
        Ok(bill_rows(page, n))
    }
}
