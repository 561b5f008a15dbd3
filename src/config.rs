use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub extraction: ExtractionConfig,
    pub retry: RetryConfig,
    pub vision: VisionConfig,
    pub fetch: FetchConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// /history 保留的最近请求数
    pub history_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            history_limit: 50,
        }
    }
}

/// 抽取路径: OCR 几何解析 或 视觉模型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    #[default]
    Ocr,
    Vision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
    /// 同时处理的页数上限
    pub max_concurrency: usize,
    pub y_tolerance: f64,
    /// PDF 渲染 DPI
    pub dpi: u32,
    /// tesseract 语言包, 如 "eng" 或 "eng+hin"
    pub ocr_lang: String,
    /// 设置后把每页 OCR 结果写成 JSON, 便于排查
    pub debug_dir: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Ocr,
            max_concurrency: 4,
            y_tolerance: crate::parser::DEFAULT_Y_TOLERANCE,
            dpi: 300,
            ocr_lang: "eng".to_string(),
            debug_dir: None,
        }
    }
}

/// 视觉模型限流重试策略
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 1_000,
            max_jitter_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}

impl VisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 请求体中查找文档 URL 的字段, 按优先级排列
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub url_fields: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            url_fields: ["document", "url", "document_url", "file_url", "image_url"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 < bill-extract.toml < BILL_EXTRACT__* 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("bill-extract").required(false))
            .add_source(
                Environment::with_prefix("BILL_EXTRACT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("input.url_fields")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        if config.vision.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                config.vision.api_key = key;
            }
        }
        Ok(config)
    }
}
