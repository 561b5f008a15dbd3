use crate::error::ExtractError;
use crate::models::WordBox;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// OCR 引擎: 图片 -> 单词框
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image_path: &Path) -> Result<Vec<WordBox>, ExtractError>;
}

/// 调用 tesseract 命令行, 读取 TSV 输出
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    lang: String,
}

impl TesseractOcr {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }
}

/// 解析 tesseract TSV; 丢弃空文本行, conf 为负时置为 None
pub fn parse_tsv(tsv: &str) -> Vec<WordBox> {
    let mut lines = tsv.lines();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split('\t').collect();
    let col = |name: &str| columns.iter().position(|c| c.trim() == name);
    let (Some(left), Some(top), Some(width), Some(height), Some(conf), Some(text)) = (
        col("left"),
        col("top"),
        col("width"),
        col("height"),
        col("conf"),
        col("text"),
    ) else {
        return Vec::new();
    };

    lines
        .filter_map(|row| {
            let fields: Vec<&str> = row.split('\t').collect();
            let word = fields.get(text)?.trim();
            if word.is_empty() {
                return None;
            }
            let int = |idx: usize| fields.get(idx).and_then(|v| v.trim().parse::<i32>().ok());
            let confidence = fields
                .get(conf)
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|c| *c >= 0.0);
            Some(WordBox {
                text: word.to_string(),
                left: int(left)?,
                top: int(top)?,
                width: int(width)?,
                height: int(height)?,
                confidence,
            })
        })
        .collect()
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image_path: &Path) -> Result<Vec<WordBox>, ExtractError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("tsv")
            .output()
            .await
            .map_err(|e| ExtractError::Ocr(format!("failed to invoke tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr(format!("tesseract failed: {}", stderr.trim())));
        }

        let words = parse_tsv(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!("OCR extracted {} words from {}", words.len(), image_path.display());
        Ok(words)
    }
}
