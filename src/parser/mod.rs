//! 基于 OCR 单词坐标的几何解析: 行聚类, 明细抽取, 合计识别, 页面分类

pub mod classify;
pub mod items;
pub mod lines;
pub mod numeric;
pub mod totals;

pub use classify::{classify_lines, classify_page};
pub use items::{parse_items, parse_line};
pub use lines::{group_lines, DEFAULT_Y_TOLERANCE};
pub use numeric::{parse_numeric, round2};
pub use totals::find_totals;

use crate::models::{PageType, ParsedItem, TotalsMap, WordBox};

/// OCR 路径的整页解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricPage {
    pub page_type: PageType,
    pub items: Vec<ParsedItem>,
    pub totals: TotalsMap,
}

/// 行聚类 -> 明细解析 -> 合计识别 -> 页面分类
pub fn parse_page(words: &[WordBox], y_tol: f64) -> GeometricPage {
    let lines = group_lines(words, y_tol);
    let items = parse_items(&lines);
    let totals = find_totals(&lines);
    let page_type = classify_lines(&lines);
    GeometricPage {
        page_type,
        items,
        totals,
    }
}
