use serde_json::Value;

fn looks_like_url(s: &str) -> bool {
    let s = s.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

/// 在请求体中查找文档 URL
///
/// 先按 `fields` 的优先级读取顶层字段, 找不到时深度优先扫描整个请求体,
/// 返回第一个 http(s) 字符串.
pub fn find_document_url(body: &Value, fields: &[String]) -> Option<String> {
    if let Value::Object(map) = body {
        let preferred = fields.iter().find_map(|field| match map.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        });
        if preferred.is_some() {
            return preferred;
        }
    }
    scan_for_url(body)
}

fn scan_for_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if looks_like_url(s) => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(scan_for_url),
        Value::Object(map) => map.values().find_map(scan_for_url),
        _ => None,
    }
}
