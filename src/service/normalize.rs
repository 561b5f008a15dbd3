use crate::models::{BillItem, ParsedItem};
use crate::parser::parse_numeric;
use serde_json::Value;

/// 尽力把任意 JSON 值转为数值, 无法转换时为 0.0
fn coerce_number(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_numeric(s),
        _ => None,
    };
    number.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn coerce_name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// 规范化一条模型返回的明细; 对任何输入形态都不会失败
pub fn normalize_item(raw: &Value) -> BillItem {
    BillItem {
        item_name: coerce_name(raw.get("item_name")),
        item_amount: coerce_number(raw.get("item_amount")),
        item_rate: coerce_number(raw.get("item_rate")),
        item_quantity: coerce_number(raw.get("item_quantity")),
    }
}

pub fn normalize_items(raw: &[Value]) -> Vec<BillItem> {
    raw.iter().map(normalize_item).collect()
}

pub fn normalize_parsed(items: Vec<ParsedItem>) -> Vec<BillItem> {
    items.into_iter().map(BillItem::from).collect()
}
