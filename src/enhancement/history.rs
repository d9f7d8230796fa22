use super::types::{EnhancementResult, Outcome, HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub message: String,
    pub outcome: Outcome,
}

impl HistoryEntry {
    pub fn from_result(result: &EnhancementResult) -> Self {
        Self {
            message: result.message(),
            outcome: result.outcome,
        }
    }
}

/// Recent attempts, newest first, never more than [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History with `entry` at the front; the oldest entry falls off past capacity.
    pub fn record(&self, entry: HistoryEntry) -> History {
        let mut entries = self.entries.clone();
        entries.push_front(entry);
        entries.truncate(HISTORY_CAPACITY);
        History { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(i: usize) -> HistoryEntry {
        HistoryEntry {
            message: format!("attempt {i}"),
            outcome: Outcome::Failure,
        }
    }

    #[test]
    fn test_record_prepends() {
        let history = History::new().record(entry(1)).record(entry(2));
        let messages: Vec<&str> = history.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["attempt 2", "attempt 1"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::new();
        for i in 1..=21 {
            history = history.record(entry(i));
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.latest().unwrap().message, "attempt 21");
        assert!(history.iter().all(|e| e.message != "attempt 1"));
        assert!(history.iter().any(|e| e.message == "attempt 2"));
    }

    #[test]
    fn test_record_leaves_original_untouched() {
        let original = History::new().record(entry(1));
        let _ = original.record(entry(2));
        assert_eq!(original.len(), 1);
    }
}
