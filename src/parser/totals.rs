use crate::models::{Line, TotalsMap};
use crate::parser::numeric::{numeric_token, round2};

const TOTAL_KEYWORDS: [&str; 8] = [
    "total",
    "subtotal",
    "grand total",
    "amount payable",
    "net amount",
    "balance due",
    "invoice total",
    "total amount",
];

/// 无关键词时, 视为小计候选的最大单词数
const UNLABELED_MAX_WORDS: usize = 4;

/// 查找合计/小计行
///
/// 自底向上扫描: 含关键词的行取最右侧数值; 不含关键词但不超过 4 个单词且
/// 恰有一个数值的行视为无标签小计. 同一行文本只记录一次, 位置以首次为准.
pub fn find_totals(lines: &[Line]) -> TotalsMap {
    let mut totals = TotalsMap::new();

    for line in lines.iter().rev() {
        let lowered = line.text.to_lowercase();
        let numerics: Vec<_> = line.words.iter().filter_map(numeric_token).collect();

        let value = if TOTAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            numerics.iter().max_by_key(|t| t.left).map(|t| t.value)
        } else if line.words.len() <= UNLABELED_MAX_WORDS && numerics.len() == 1 {
            Some(numerics[0].value)
        } else {
            None
        };

        if let Some(value) = value {
            totals.insert(line.text.trim().to_string(), round2(value));
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordBox;
    use pretty_assertions::assert_eq;

    fn line(words: &[(&str, i32)]) -> Line {
        Line::from_words(
            words
                .iter()
                .map(|(text, left)| WordBox::new(*text, *left, 0, 30, 20))
                .collect(),
        )
    }

    #[test]
    fn records_labeled_grand_total() {
        let totals = find_totals(&[line(&[("Grand", 10), ("Total", 70), ("45000", 400)])]);
        assert_eq!(totals.get("Grand Total 45000"), Some(&45000.0));
    }

    #[test]
    fn takes_rightmost_number_on_labeled_line() {
        let totals = find_totals(&[line(&[
            ("Total", 10),
            ("3", 100),
            ("items", 150),
            ("1,250.75", 400),
        ])]);
        assert_eq!(totals.get("Total 3 items 1,250.75"), Some(&1250.75));
    }

    #[test]
    fn short_line_with_single_number_is_unlabeled_subtotal() {
        let lines = vec![
            line(&[("Paracetamol", 10), ("2", 200), ("10", 300), ("20", 400)]),
            line(&[("Carried", 10), ("forward", 90), ("980", 400)]),
        ];
        let totals = find_totals(&lines);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals.get("Carried forward 980"), Some(&980.0));
    }

    #[test]
    fn scans_from_the_bottom_of_the_page() {
        let lines = vec![
            line(&[("Subtotal", 10), ("900", 400)]),
            line(&[("Tax", 10), ("100", 400)]),
            line(&[("Grand", 10), ("Total", 70), ("1000", 400)]),
        ];
        let totals = find_totals(&lines);
        let keys: Vec<&str> = totals.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Grand Total 1000", "Tax 100", "Subtotal 900"]);
    }

    #[test]
    fn labeled_line_without_numbers_is_ignored() {
        assert!(find_totals(&[line(&[("Total", 10), ("Amount", 70)])]).is_empty());
    }
}
