use crate::models::PageResult;
use crate::service::page_task::{PageContext, PageSource, PageTask};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 页面编排: 有界并发执行各页任务, 按页码重新排序
#[derive(Clone)]
pub struct PageOrchestrator {
    ctx: Arc<PageContext>,
    max_concurrency: usize,
}

impl PageOrchestrator {
    pub fn new(ctx: PageContext, max_concurrency: usize) -> Self {
        Self {
            ctx: Arc::new(ctx),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 处理 1..=page_count 页, 等待全部任务结束
    pub async fn run(&self, source: PageSource, page_count: u32) -> Vec<PageResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut pending = FuturesUnordered::new();

        tracing::info!(
            "Dispatching {} page(s), max concurrent: {}",
            page_count,
            self.max_concurrency
        );

        for page_no in 1..=page_count {
            let task = PageTask::new(page_no, source.clone());
            let ctx = Arc::clone(&self.ctx);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(run_with_permit(semaphore, task, ctx));
            pending.push(async move { (page_no, handle.await) });
        }

        // 完成顺序不确定
        let mut results = Vec::with_capacity(page_count as usize);
        while let Some((page_no, joined)) = pending.next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Page {} task aborted: {}", page_no, e);
                    results.push(PageResult::failed(page_no));
                }
            }
        }

        results.sort_by_key(PageResult::page_number);
        results
    }
}

/// 获取许可后才开始渲染/抽取; 信号量关闭时该页记为失败
async fn run_with_permit(semaphore: Arc<Semaphore>, task: PageTask, ctx: Arc<PageContext>) -> PageResult {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::error!("Page {} could not acquire a slot: {}", task.page_no(), e);
            return PageResult::failed(task.page_no());
        }
    };
    task.run(&ctx).await
}

impl std::fmt::Debug for PageOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageOrchestrator")
            .field("extractor", &self.ctx.extractor)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}
