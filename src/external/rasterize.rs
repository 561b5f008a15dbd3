use crate::error::ExtractError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// PDF 页面渲染
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractError>;

    /// 渲染第 `page_no` 页 (从 1 开始) 到 `out_dir`, 返回图片路径
    async fn rasterize(&self, pdf_path: &Path, page_no: u32, out_dir: &Path) -> Result<PathBuf, ExtractError>;
}

/// 调用 poppler-utils (pdfinfo / pdftoppm)
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    dpi: u32,
}

impl PopplerRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

/// 从 pdfinfo 输出中读取 "Pages:" 行
pub fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    pdfinfo_output
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

#[async_trait]
impl Rasterizer for PopplerRasterizer {
    async fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractError> {
        let output = Command::new("pdfinfo")
            .arg(pdf_path)
            .output()
            .await
            .map_err(|e| ExtractError::Rasterization(format!("failed to invoke pdfinfo; is poppler-utils installed? {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Rasterization(format!("pdfinfo failed: {}", stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_page_count(&stdout) {
            Some(count) if count > 0 => Ok(count),
            _ => Err(ExtractError::Rasterization("pdfinfo reported no pages".to_string())),
        }
    }

    async fn rasterize(&self, pdf_path: &Path, page_no: u32, out_dir: &Path) -> Result<PathBuf, ExtractError> {
        let prefix = out_dir.join(format!("page_{page_no}"));
        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page_no.to_string())
            .arg("-l")
            .arg(page_no.to_string())
            .arg(pdf_path)
            .arg(&prefix)
            .status()
            .await
            .map_err(|e| ExtractError::Rasterization(format!("failed to invoke pdftoppm: {e}")))?;

        if !status.success() {
            return Err(ExtractError::Rasterization(format!(
                "pdftoppm failed on page {page_no} with status: {status}"
            )));
        }

        let image_path = prefix.with_extension("png");
        if !image_path.exists() {
            return Err(ExtractError::Rasterization(format!(
                "expected rendered image not found: {}",
                image_path.display()
            )));
        }
        Ok(image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_page_count_from_pdfinfo() {
        let output = "Producer:       Skia/PDF m116\nPages:          3\nEncrypted:      no\n";
        assert_eq!(parse_page_count(output), Some(3));
    }

    #[test]
    fn missing_pages_line_yields_none() {
        assert_eq!(parse_page_count("Title: scan\n"), None);
    }
}
