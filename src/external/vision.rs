use crate::config::VisionConfig;
use crate::error::ExtractError;
use crate::models::TokenUsage;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

const SYSTEM_PROMPT: &str = "You are an invoice parsing expert. You read scanned hospital and pharmacy bills.";

const USER_PROMPT: &str = r#"Extract every line item from this bill page.
Return only a JSON object of the form:
{"page_type": "Pharmacy" | "Final Bill" | "Bill Detail",
 "bill_items": [{"item_name": string, "item_quantity": number, "item_rate": number, "item_amount": number}]}
Do not include totals, subtotals or taxes as items."#;

/// 视觉模型的单页输出 (未规范化)
#[derive(Debug, Clone, PartialEq)]
pub struct VisionOutput {
    pub page_type: String,
    pub items: Vec<Value>,
    pub usage: TokenUsage,
}

/// 视觉模型抽取
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    async fn extract(&self, image_path: &Path) -> Result<VisionOutput, ExtractError>;
}

/// OpenAI 兼容的 chat/completions 接口
#[derive(Debug, Clone)]
pub struct OpenAiVision {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiVision {
    /// 模型名在启动时确定, 之后不再变化
    pub fn new(config: &VisionConfig) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ExtractError::ExtractionFatal(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "image/png",
    }
}

/// 去掉 ```json ... ``` 代码块包裹
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // 跳过语言标记 (如 "json")
    match inner.find('\n') {
        Some(pos) if !inner[..pos].trim_start().starts_with(['{', '[']) => inner[pos + 1..].trim(),
        _ => inner.trim(),
    }
}

/// 严格解析模型回复, 任何非 JSON 或结构不符的内容都视为失败
pub fn parse_vision_reply(reply: &str) -> Result<(String, Vec<Value>), ExtractError> {
    let body = strip_code_fence(reply);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ExtractError::ExtractionFatal(format!("model reply is not valid JSON: {e}")))?;

    match value {
        Value::Array(items) => Ok((String::new(), items)),
        Value::Object(mut map) => {
            let page_type = map
                .get("page_type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match map.remove("bill_items").or_else(|| map.remove("items")) {
                Some(Value::Array(items)) => Ok((page_type, items)),
                _ => Err(ExtractError::ExtractionFatal(
                    "model reply has no bill_items array".to_string(),
                )),
            }
        }
        _ => Err(ExtractError::ExtractionFatal(
            "model reply must be a JSON object or array".to_string(),
        )),
    }
}

#[async_trait]
impl VisionExtractor for OpenAiVision {
    async fn extract(&self, image_path: &Path) -> Result<VisionOutput, ExtractError> {
        let bytes = tokio::fs::read(image_path).await?;
        let data_url = format!("data:{};base64,{}", mime_for(image_path), BASE64_STANDARD.encode(&bytes));

        let body = json!({
            "model": self.model,
            "temperature": 0.0,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": [
                    {"type": "text", "text": USER_PROMPT},
                    {"type": "image_url", "image_url": {"url": data_url}}
                ]}
            ]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::ExtractionFatal(format!("vision request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExtractError::RateLimited(format!("{} returned 429", self.model)));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractError::ExtractionFatal(format!("vision API returned {status}: {text}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::ExtractionFatal(format!("malformed vision response: {e}")))?;
        let usage = chat.usage.unwrap_or_default();
        let reply = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractError::ExtractionFatal("vision response has no content".to_string()))?;

        let (page_type, items) = parse_vision_reply(&reply)?;
        tracing::info!(
            "Vision model {} returned {} items, tokens: {}",
            self.model,
            items.len(),
            usage.total_tokens
        );

        Ok(VisionOutput {
            page_type,
            items,
            usage: TokenUsage::new(usage.prompt_tokens, usage.completion_tokens, usage.total_tokens),
        })
    }
}
