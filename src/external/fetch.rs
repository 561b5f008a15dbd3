use crate::error::ExtractError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// 文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

/// 已下载到本地的文档; drop 时删除临时文件
#[derive(Debug)]
pub struct AcquiredDocument {
    pub file: NamedTempFile,
    pub kind: DocumentKind,
}

impl AcquiredDocument {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// 文档获取
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<AcquiredDocument, ExtractError>;
}

/// 判断文档格式: Content-Type -> URL 扩展名 -> 文件头; 图片只接受 PNG / JPEG
pub fn classify_document(
    content_type: &str,
    url: &str,
    head: &[u8],
) -> Result<(DocumentKind, &'static str), ExtractError> {
    let ct = content_type.to_lowercase();
    if ct.contains("pdf") {
        return Ok((DocumentKind::Pdf, ".pdf"));
    }
    if ct.contains("png") {
        return Ok((DocumentKind::Image, ".png"));
    }
    if ct.contains("jpeg") || ct.contains("jpg") {
        return Ok((DocumentKind::Image, ".jpg"));
    }

    let path = url.split('?').next().unwrap_or_default().to_lowercase();
    if path.ends_with(".pdf") {
        return Ok((DocumentKind::Pdf, ".pdf"));
    }
    if path.ends_with(".png") {
        return Ok((DocumentKind::Image, ".png"));
    }
    if path.ends_with(".jpg") {
        return Ok((DocumentKind::Image, ".jpg"));
    }
    if path.ends_with(".jpeg") {
        return Ok((DocumentKind::Image, ".jpeg"));
    }

    if head.starts_with(b"%PDF") {
        return Ok((DocumentKind::Pdf, ".pdf"));
    }
    if head.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Ok((DocumentKind::Image, ".png"));
    }
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok((DocumentKind::Image, ".jpg"));
    }
    Err(ExtractError::UnsupportedFormat(if ct.is_empty() {
        "unknown content type".to_string()
    } else {
        ct
    }))
}

/// 通过 HTTP 下载文档
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<AcquiredDocument, ExtractError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        let bytes = response.bytes().await?;

        let (kind, suffix) = classify_document(&content_type, url, &bytes)?;
        let file = tempfile::Builder::new()
            .prefix("bill-")
            .suffix(suffix)
            .tempfile()?;
        tokio::fs::write(file.path(), &bytes).await?;

        tracing::info!(
            "Downloaded {} bytes from {} ({:?}, content-type: {})",
            bytes.len(),
            url,
            kind,
            content_type
        );

        Ok(AcquiredDocument { file, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_takes_precedence() {
        let (kind, suffix) = classify_document("application/pdf", "https://x/a.png", b"").unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
        assert_eq!(suffix, ".pdf");
    }

    #[test]
    fn falls_back_to_url_extension_ignoring_query() {
        let (kind, suffix) =
            classify_document("application/octet-stream", "https://x/bill.JPEG?sig=abc", b"").unwrap();
        assert_eq!(kind, DocumentKind::Image);
        assert_eq!(suffix, ".jpeg");
    }

    #[test]
    fn sniffs_magic_bytes() {
        let (kind, _) = classify_document("", "https://x/download", b"%PDF-1.7\n").unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
        let (kind, _) = classify_document("", "https://x/download", &[0x89, b'P', b'N', b'G', 0x0D]).unwrap();
        assert_eq!(kind, DocumentKind::Image);
    }

    #[test]
    fn rejects_unknown_formats() {
        let err = classify_document("text/html", "https://x/page", b"<html>").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_images_other_than_png_and_jpeg() {
        let err = classify_document("image/gif", "https://x/scan", b"GIF89a").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(ct) if ct == "image/gif"));
        let err = classify_document("image/webp", "https://x/scan.webp", b"RIFF").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }
}
