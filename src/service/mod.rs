pub mod aggregator;
pub mod extractor;
pub mod normalize;
pub mod orchestrator;
pub mod page_task;
pub mod retry;

pub use aggregator::aggregate;
pub use extractor::ExtractionService;
pub use orchestrator::PageOrchestrator;
pub use page_task::{PageContext, PageExtractor, PageSource, PageState, PageTask};
pub use retry::RetryPolicy;
