//! 外部协作者: 下载, PDF 渲染, OCR, 视觉模型

pub mod fetch;
pub mod ocr;
pub mod rasterize;
pub mod vision;

pub use fetch::{classify_document, AcquiredDocument, DocumentFetcher, DocumentKind, HttpFetcher};
pub use ocr::{OcrEngine, TesseractOcr};
pub use rasterize::{PopplerRasterizer, Rasterizer};
pub use vision::{parse_vision_reply, OpenAiVision, VisionExtractor, VisionOutput};
