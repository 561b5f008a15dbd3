use serde::{Deserialize, Serialize};

/// 几何解析器产出的原始明细 (字段可能缺失)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    pub item_name: Option<String>,
    pub item_amount: Option<f64>,
    pub item_rate: Option<f64>,
    pub item_quantity: Option<f64>,
}

/// 规范化后的账单明细, 四个字段总是存在
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub item_name: String,
    pub item_amount: f64,
    pub item_rate: f64,
    pub item_quantity: f64,
}

impl From<ParsedItem> for BillItem {
    fn from(item: ParsedItem) -> Self {
        Self {
            item_name: item
                .item_name
                .map(|n| n.trim().to_string())
                .unwrap_or_default(),
            item_amount: item.item_amount.unwrap_or(0.0),
            item_rate: item.item_rate.unwrap_or(0.0),
            item_quantity: item.item_quantity.unwrap_or(0.0),
        }
    }
}

/// Token 用量统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64, total_tokens: u64) -> Self {
        Self {
            total_tokens,
            input_tokens,
            output_tokens,
        }
    }
}

impl std::ops::Add for TokenUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total_tokens: self.total_tokens + rhs.total_tokens,
            input_tokens: self.input_tokens + rhs.input_tokens,
            output_tokens: self.output_tokens + rhs.output_tokens,
        }
    }
}

impl std::iter::Sum for TokenUsage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, u| acc + u)
    }
}
