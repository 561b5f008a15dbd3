use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// 一次抽取请求的摘要
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub url: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub is_success: bool,
    pub page_count: usize,
    pub total_item_count: usize,
    pub error: Option<String>,
}

/// 仅保存在内存中的最近请求记录
#[derive(Debug)]
pub struct HistoryStore {
    entries: Mutex<VecDeque<HistoryEntry>>,
    limit: usize,
}

impl HistoryStore {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(limit)),
            limit,
        }
    }

    pub fn record(&self, entry: HistoryEntry) {
        if self.limit == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.limit {
            entries.pop_back();
        }
        entries.push_front(entry);
    }

    /// 最新的在前
    pub fn recent(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }
}
