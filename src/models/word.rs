use serde::{Deserialize, Serialize};

/// OCR 识别出的单词及其像素边框
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl WordBox {
    pub fn new(text: impl Into<String>, left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
            confidence: None,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// 垂直中心 (用于行聚类)
    pub fn y_center(&self) -> f64 {
        f64::from(self.top) + f64::from(self.height) / 2.0
    }
}

/// 同一垂直带内的一行单词, 按 left 升序
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub words: Vec<WordBox>,
}

impl Line {
    pub fn from_words(mut words: Vec<WordBox>) -> Self {
        // 稳定排序, 同 left 保留原顺序
        words.sort_by_key(|w| w.left);
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, words }
    }
}

/// 可解析为数值的单词
#[derive(Debug, Clone, PartialEq)]
pub struct NumericToken {
    pub left: i32,
    pub raw: String,
    pub value: f64,
}
