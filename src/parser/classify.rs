use crate::models::{Line, PageType};

/// 根据页面文本关键词判断页面类型
pub fn classify_page(text: &str) -> PageType {
    let lowered = text.to_lowercase();
    if lowered.contains("pharmacy") {
        PageType::Pharmacy
    } else if ["final amount", "total amount", "grand total"]
        .iter()
        .any(|k| lowered.contains(k))
    {
        PageType::FinalBill
    } else {
        PageType::BillDetail
    }
}

pub fn classify_lines(lines: &[Line]) -> PageType {
    let text = lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    classify_page(&text)
}
