use crate::models::{NumericToken, WordBox};

/// 解析票据上的金额/数量文本, 容忍 "₹1,234.50" 和 "500/-" 这类写法
pub fn parse_numeric(token: &str) -> Option<f64> {
    let stripped = token
        .trim()
        .replace(['₹', '$', ','], "")
        .replace("/-", "");
    let cleaned: String = stripped
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 单词 -> 数值 token, 不可解析时返回 None
pub fn numeric_token(word: &WordBox) -> Option<NumericToken> {
    parse_numeric(&word.text).map(|value| NumericToken {
        left: word.left,
        raw: word.text.clone(),
        value,
    })
}

/// 保留两位小数, 恰好的半分值舍入到偶数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
