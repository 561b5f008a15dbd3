use crate::models::{BillItem, TokenUsage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 行文本 -> 金额, 按自底向上的扫描顺序插入
pub type TotalsMap = IndexMap<String, f64>;

/// 页面类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    #[serde(rename = "Pharmacy")]
    Pharmacy,
    #[serde(rename = "Final Bill")]
    FinalBill,
    #[default]
    #[serde(rename = "Bill Detail")]
    BillDetail,
}

impl PageType {
    /// 宽松解析模型返回的页面类型, 未知值回落为 Bill Detail
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pharmacy" => Self::Pharmacy,
            "finalbill" => Self::FinalBill,
            _ => Self::BillDetail,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pharmacy => "Pharmacy",
            Self::FinalBill => "Final Bill",
            Self::BillDetail => "Bill Detail",
        }
    }
}

/// 单页抽取状态, 用于区分"抽取失败"与"本页无明细"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Succeeded,
    Failed,
}

/// 单页结果, 任务结束后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub page_no: String,
    pub page_type: PageType,
    pub bill_items: Vec<BillItem>,
    pub token_usage: TokenUsage,
    pub extraction_status: PageStatus,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub detected_totals: TotalsMap,
}

impl PageResult {
    /// 失败页: 空明细, 零用量, 默认页面类型
    pub fn failed(page_no: u32) -> Self {
        Self {
            page_no: page_no.to_string(),
            page_type: PageType::BillDetail,
            bill_items: Vec::new(),
            token_usage: TokenUsage::default(),
            extraction_status: PageStatus::Failed,
            detected_totals: TotalsMap::new(),
        }
    }

    /// page_no 的数值, 用于排序
    pub fn page_number(&self) -> u32 {
        self.page_no.parse().unwrap_or(u32::MAX)
    }
}

/// 整个文档的抽取结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub is_success: bool,
    pub token_usage: TokenUsage,
    pub pagewise_line_items: Vec<PageResult>,
    pub total_item_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_type_serializes_with_display_names() {
        let json = serde_json::to_string(&PageType::FinalBill).unwrap();
        assert_eq!(json, "\"Final Bill\"");
        let back: PageType = serde_json::from_str("\"Bill Detail\"").unwrap();
        assert_eq!(back, PageType::BillDetail);
    }

    #[test]
    fn page_type_label_parsing_is_lenient() {
        assert_eq!(PageType::from_label("final_bill"), PageType::FinalBill);
        assert_eq!(PageType::from_label(" PHARMACY "), PageType::Pharmacy);
        assert_eq!(PageType::from_label("receipt"), PageType::BillDetail);
    }

    #[test]
    fn failed_page_omits_totals_and_reports_status() {
        let value = serde_json::to_value(PageResult::failed(2)).unwrap();
        assert_eq!(value["page_no"], "2");
        assert_eq!(value["page_type"], "Bill Detail");
        assert_eq!(value["extraction_status"], "failed");
        assert!(value.get("detected_totals").is_none());
        assert_eq!(value["bill_items"].as_array().map(Vec::len), Some(0));
    }
}
