//! Analysis history
//!
//! In-memory, most-recent-first list of completed analyses. Lives for the
//! process only; nothing is persisted to disk.

use crate::workflow::record::AnalysisRecord;

/// Session-scoped history of analysis records
#[derive(Default)]
pub struct HistoryStore {
    records: Vec<AnalysisRecord>,
}

impl HistoryStore {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record at the front. Repeat analyses of the same file are
    /// separate entries; nothing is deduplicated.
    pub fn push(&mut self, record: AnalysisRecord) {
        self.records.insert(0, record);
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// The most recent record
    pub fn latest(&self) -> Option<&AnalysisRecord> {
        self.records.first()
    }

    /// Iterate records, most recent first
    pub fn iter(&self) -> std::slice::Iter<'_, AnalysisRecord> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotscope::audio::AudioClip;

    fn record(name: &str) -> AnalysisRecord {
        AnalysisRecord::failure(AudioClip::from_bytes(name, vec![0u8; 8]), "test")
    }

    #[test]
    fn test_history_starts_empty() {
        let history = HistoryStore::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.latest().is_none());
    }

    #[test]
    fn test_push_puts_newest_first() {
        let mut history = HistoryStore::new();
        history.push(record("first.wav"));
        history.push(record("second.wav"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().filename(), "second.wav");
        let names: Vec<&str> = history.iter().map(|r| r.filename()).collect();
        assert_eq!(names, vec!["second.wav", "first.wav"]);
    }

    #[test]
    fn test_get_by_id() {
        let mut history = HistoryStore::new();
        let rec = record("a.wav");
        let id = rec.id().to_string();
        history.push(rec);
        history.push(record("b.wav"));
        assert_eq!(history.get(&id).unwrap().filename(), "a.wav");
        assert!(history.get("nope").is_none());
    }

    #[test]
    fn test_same_file_analyzed_twice_keeps_both() {
        let mut history = HistoryStore::new();
        history.push(record("same.wav"));
        history.push(record("same.wav"));
        assert_eq!(history.len(), 2);
        let ids: Vec<&str> = history.iter().map(|r| r.id()).collect();
        assert_ne!(ids[0], ids[1]);
    }
}
