use crate::models::{DocumentResult, PageResult, TokenUsage};

/// 汇总各页结果; 单页失败不影响 is_success
pub fn aggregate(mut pages: Vec<PageResult>) -> DocumentResult {
    pages.sort_by_key(PageResult::page_number);
    let total_item_count = pages.iter().map(|p| p.bill_items.len()).sum();
    let token_usage: TokenUsage = pages.iter().map(|p| p.token_usage).sum();

    DocumentResult {
        is_success: true,
        token_usage,
        pagewise_line_items: pages,
        total_item_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillItem, PageStatus, PageType, TotalsMap};

    fn page(no: u32, items: usize, tokens: u64) -> PageResult {
        PageResult {
            page_no: no.to_string(),
            page_type: PageType::BillDetail,
            bill_items: (0..items)
                .map(|i| BillItem {
                    item_name: format!("item {i}"),
                    item_amount: 1.0,
                    item_rate: 1.0,
                    item_quantity: 1.0,
                })
                .collect(),
            token_usage: TokenUsage::new(tokens, tokens, tokens * 2),
            extraction_status: PageStatus::Succeeded,
            detected_totals: TotalsMap::new(),
        }
    }

    #[test]
    fn sums_items_and_tokens() {
        let result = aggregate(vec![page(1, 2, 10), PageResult::failed(2), page(3, 4, 5)]);
        assert!(result.is_success);
        assert_eq!(result.total_item_count, 6);
        assert_eq!(result.token_usage, TokenUsage::new(15, 15, 30));
    }

    #[test]
    fn orders_pages_numerically() {
        let result = aggregate(vec![page(10, 0, 0), page(2, 0, 0), page(1, 0, 0)]);
        let order: Vec<&str> = result.pagewise_line_items.iter().map(|p| p.page_no.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "10"]);
    }

    #[test]
    fn empty_document_has_zero_counts() {
        let result = aggregate(Vec::new());
        assert_eq!(result.total_item_count, 0);
        assert_eq!(result.token_usage, TokenUsage::default());
    }
}
