use std::collections::VecDeque;

use crate::config::DEFAULT_HISTORY_LIMIT;

/// In-memory command history, oldest first, capped at `limit` entries.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl CommandHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.trim().is_empty() || self.limit == 0 {
            return;
        }

        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
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

    #[test]
    fn drops_oldest_past_limit() {
        let mut history = CommandHistory::with_limit(2);
        history.push("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(history.last(), Some("c"));
    }

    #[test]
    fn ignores_blank_lines() {
        let mut history = CommandHistory::default();
        history.push("  ");
        assert!(history.is_empty());
    }
}
