use std::collections::HashSet;

use crate::models::{CandidateRecord, DedupKey};

/// Remembers accepted (title, year) pairs across pages.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    seen: HashSet<DedupKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&self, record: &CandidateRecord) -> bool {
        !self.seen.contains(&record.dedup_key())
    }

    pub fn remember(&mut self, record: &CandidateRecord) {
        self.seen.insert(record.dedup_key());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_normalized_pairs() {
        let mut dedup = Deduplicator::new();
        let first = CandidateRecord::new("Movie", "2020");
        assert!(dedup.is_new(&first));

        dedup.remember(&first);
        assert!(!dedup.is_new(&CandidateRecord::new(" movie ", "2020")));
        assert!(dedup.is_new(&CandidateRecord::new("Movie", "2021")));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn checking_has_no_side_effect() {
        let dedup = Deduplicator::new();
        let record = CandidateRecord::new("Movie", "2020");
        assert!(dedup.is_new(&record));
        assert!(dedup.is_new(&record));
        assert!(dedup.is_empty());
    }
}
