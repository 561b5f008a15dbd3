use crate::models::{Line, WordBox};

/// 默认行聚类容差 (与 OCR 坐标同单位, 像素)
pub const DEFAULT_Y_TOLERANCE: f64 = 14.0;

/// 按垂直距离把单词聚成行
///
/// 单词先按 y_center 排序, 再自上而下串联: 与当前行最后一个单词的
/// 中心距离不超过 `y_tol` 即并入当前行, 否则另起一行. 这是链式聚类,
/// 高行会逐渐漂移, 下游解析依赖这一行为.
pub fn group_lines(words: &[WordBox], y_tol: f64) -> Vec<Line> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&WordBox> = words.iter().collect();
    sorted.sort_by(|a, b| a.y_center().total_cmp(&b.y_center()));

    let mut clusters: Vec<Vec<WordBox>> = Vec::new();
    let mut current: Vec<WordBox> = Vec::new();

    for word in sorted {
        let joins = current
            .last()
            .map_or(true, |last| (word.y_center() - last.y_center()).abs() <= y_tol);
        if !joins {
            clusters.push(std::mem::take(&mut current));
        }
        current.push(word.clone());
    }
    clusters.push(current);

    clusters.into_iter().map(Line::from_words).collect()
}
