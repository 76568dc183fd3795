use crate::models::{AcceptedRecord, CandidateRecord};
use crate::pipeline::{Deduplicator, DetailRules, RejectReason};

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub record: CandidateRecord,
    pub reason: RejectReason,
}

/// Accumulated state of one run, passed into and returned from each page step.
#[derive(Debug, Clone)]
pub struct RunState {
    /// 1-based page currently being processed.
    pub page_number: u32,
    pub target_count: Option<usize>,
    pub min_popularity: Option<u64>,
    pub rank_ceiling: Option<u32>,
    pub details: DetailRules,
    pub accepted: Vec<AcceptedRecord>,
    pub rejected: Vec<RejectedRecord>,
    /// Rows the extractor dropped before they became candidates.
    pub skipped_rows: usize,
    pub dedup: Deduplicator,
}

impl RunState {
    pub fn new(target_count: Option<usize>, min_popularity: Option<u64>, rank_ceiling: Option<u32>) -> Self {
        Self {
            page_number: 1,
            target_count,
            min_popularity,
            rank_ceiling,
            details: DetailRules::default(),
            accepted: Vec::new(),
            rejected: Vec::new(),
            skipped_rows: 0,
            dedup: Deduplicator::new(),
        }
    }

    pub fn with_details(mut self, details: DetailRules) -> Self {
        self.details = details;
        self
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn cap_reached(&self) -> bool {
        self.target_count
            .is_some_and(|target| self.accepted.len() >= target)
    }

    /// Append to the output sequence. The caller has already run the filter
    /// and the dedup check.
    pub fn accept(&mut self, record: CandidateRecord) -> &AcceptedRecord {
        self.dedup.remember(&record);
        let original_order = self.accepted.len() + 1;
        self.accepted.push(AcceptedRecord {
            record,
            original_order,
        });
        &self.accepted[original_order - 1]
    }

    pub fn reject(&mut self, record: CandidateRecord, reason: RejectReason) -> &RejectedRecord {
        self.rejected.push(RejectedRecord { record, reason });
        &self.rejected[self.rejected.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptance_numbers_from_one() {
        let mut state = RunState::new(Some(2), None, None);
        assert_eq!(state.accept(CandidateRecord::new("A", "2001")).original_order, 1);
        assert!(!state.cap_reached());
        assert_eq!(state.accept(CandidateRecord::new("B", "2002")).original_order, 2);
        assert!(state.cap_reached());
        assert!(!state.dedup.is_new(&CandidateRecord::new("a", "2001")));
    }

    #[test]
    fn unbounded_runs_never_cap() {
        let mut state = RunState::new(None, None, None);
        for i in 0..100 {
            state.accept(CandidateRecord::new(format!("Film {}", i), "2000"));
        }
        assert!(!state.cap_reached());
        assert_eq!(state.accepted_count(), 100);
    }
}
