use crate::models::{Line, NumericToken, ParsedItem};
use crate::parser::numeric::{numeric_token, round2};
use std::collections::HashSet;

/// 从一行中抽取明细
///
/// 数值 token 按 left 排序后自右向左分配: 最右为金额, 其次单价, 再次数量.
/// 名称取最左数值 token 左侧的所有单词; 若为空, 则用整行文本去掉各数值
/// 原文 (仅首次出现) 作为名称.
pub fn parse_line(line: &Line) -> Option<ParsedItem> {
    let mut numerics: Vec<NumericToken> = line.words.iter().filter_map(numeric_token).collect();
    if numerics.is_empty() {
        return None;
    }
    numerics.sort_by_key(|t| t.left);

    let from_right = |n: usize| {
        numerics
            .len()
            .checked_sub(n)
            .map(|idx| round2(numerics[idx].value))
    };
    let item_amount = from_right(1);
    let item_rate = from_right(2);
    let item_quantity = from_right(3);

    let cutoff = numerics.iter().map(|t| t.left).min().unwrap_or(i32::MIN);
    let mut name = line
        .words
        .iter()
        .filter(|w| w.left < cutoff)
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    if name.is_empty() {
        let mut rest = line.text.clone();
        for token in &numerics {
            rest = rest.replacen(&token.raw, "", 1);
        }
        name = rest.trim().to_string();
    }

    Some(ParsedItem {
        item_name: (!name.is_empty()).then_some(name),
        item_amount,
        item_rate,
        item_quantity,
    })
}

/// 解析整页明细, 并按 (小写名称, 金额) 去重, 保留首次出现
pub fn parse_items(lines: &[Line]) -> Vec<ParsedItem> {
    let mut seen: HashSet<(String, Option<u64>)> = HashSet::new();
    lines
        .iter()
        .filter_map(parse_line)
        .filter(|item| {
            let key = (
                item.item_name.as_deref().unwrap_or_default().to_lowercase(),
                // -0.0 与 0.0 视为同一金额
                item.item_amount.map(|v| (v + 0.0).to_bits()),
            );
            seen.insert(key)
        })
        .collect()
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
                .map(|(text, left)| WordBox::new(*text, *left, 100, 30, 20))
                .collect(),
        )
    }

    #[test]
    fn assigns_roles_from_the_right() {
        let item = parse_line(&line(&[("2", 10), ("35", 50), ("70", 90)])).unwrap();
        assert_eq!(item.item_quantity, Some(2.0));
        assert_eq!(item.item_rate, Some(35.0));
        assert_eq!(item.item_amount, Some(70.0));
    }

    #[test]
    fn single_number_only_sets_amount() {
        let item = parse_line(&line(&[("Consultation", 10), ("500/-", 300)])).unwrap();
        assert_eq!(
            item,
            ParsedItem {
                item_name: Some("Consultation".into()),
                item_amount: Some(500.0),
                item_rate: None,
                item_quantity: None,
            }
        );
    }

    #[test]
    fn name_is_text_left_of_first_number() {
        let item = parse_line(&line(&[
            ("Dolo", 10),
            ("650mg", 60),
            ("Tab", 130),
            ("2", 300),
            ("₹35.00", 380),
            ("₹70.00", 460),
        ]))
        .unwrap();
        // "650mg" 也可解析为数值, 因此名称在其左侧截断
        assert_eq!(item.item_name.as_deref(), Some("Dolo"));
        assert_eq!(item.item_amount, Some(70.0));
        assert_eq!(item.item_rate, Some(35.0));
        assert_eq!(item.item_quantity, Some(2.0));
    }

    #[test]
    fn falls_back_to_line_text_without_numbers() {
        let item = parse_line(&line(&[("12", 5), ("Syringe", 40), ("45.50", 200)])).unwrap();
        assert_eq!(item.item_name.as_deref(), Some("Syringe"));
        assert_eq!(item.item_rate, Some(12.0));
        assert_eq!(item.item_amount, Some(45.5));
    }

    #[test]
    fn all_numeric_line_has_no_name() {
        let item = parse_line(&line(&[("1", 5), ("20", 60)])).unwrap();
        assert_eq!(item.item_name, None);
    }

    #[test]
    fn prose_line_is_skipped() {
        assert!(parse_line(&line(&[("Patient", 5), ("Name", 60)])).is_none());
    }

    #[test]
    fn amounts_are_rounded() {
        let item = parse_line(&line(&[("Gauze", 5), ("3.333", 100)])).unwrap();
        assert_eq!(item.item_amount, Some(3.33));
    }

    #[test]
    fn half_cent_amount_rounds_to_even() {
        let item = parse_line(&line(&[("Gauze", 5), ("1.125", 100)])).unwrap();
        assert_eq!(item.item_amount, Some(1.12));
    }

    #[test]
    fn negative_zero_amount_dedups_with_zero() {
        let lines = vec![
            line(&[("Discount", 5), ("-0", 300)]),
            line(&[("discount", 5), ("0", 300)]),
        ];
        assert_eq!(parse_items(&lines).len(), 1);
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let lines = vec![
            line(&[("Room", 5), ("Rent", 50), ("1500", 300)]),
            line(&[("Nursing", 5), ("800", 300)]),
            line(&[("ROOM", 5), ("rent", 50), ("1,500", 300)]),
        ];
        let items = parse_items(&lines);
        let names: Vec<_> = items.iter().map(|i| i.item_name.clone().unwrap()).collect();
        assert_eq!(names, vec!["Room Rent".to_string(), "Nursing".to_string()]);
    }
}
