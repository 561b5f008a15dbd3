use thiserror::Error;

/// 抽取流程中的错误分类
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 下载失败或响应非 2xx, 整个文档失败
    #[error("document acquisition failed: {0}")]
    Acquisition(String),

    /// 不支持的文档格式, 整个文档失败
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// PDF 渲染失败; 单页渲染只影响该页, 读取页数失败则整个文档失败
    #[error("rasterization failed: {0}")]
    Rasterization(String),

    #[error("ocr failed: {0}")]
    Ocr(String),

    /// 远端限流, 可重试
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// 重试耗尽或模型返回无法解析
    #[error("extraction failed: {0}")]
    ExtractionFatal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// 是否为可重试的临时错误
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// 在文档层面出现时是否应使整个请求失败
    pub fn is_document_level(&self) -> bool {
        matches!(
            self,
            Self::Acquisition(_) | Self::UnsupportedFormat(_) | Self::Rasterization(_) | Self::Io(_)
        )
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        Self::Acquisition(err.to_string())
    }
}
