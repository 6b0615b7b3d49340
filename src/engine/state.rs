//! Result list and status projections owned by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::core::{BenchmarkRecord, ProcessingStatus};

/// A status change for one submission. `status: None` means the projection was cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub record_id: String,
    pub status: Option<ProcessingStatus>,
}

/// Read-only view handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Newest first
    pub results: Vec<BenchmarkRecord>,
    pub status: Option<ProcessingStatus>,
    pub is_processing: bool,
}

#[derive(Debug, Default)]
pub(crate) struct DashboardState {
    /// Newest first, never re-sorted.
    results: Vec<BenchmarkRecord>,
    /// Live projections keyed by record id, in submission start order.
    statuses: Vec<(String, ProcessingStatus)>,
    in_flight: Vec<String>,
}

impl DashboardState {
    pub(crate) fn begin(&mut self, record: BenchmarkRecord) {
        self.in_flight.push(record.id.clone());
        self.results.insert(0, record);
    }

    pub(crate) fn finish(&mut self, id: &str) {
        self.in_flight.retain(|i| i != id);
    }

    /// Apply `f` to the record with `id`. Returns false if there is none.
    pub(crate) fn update_record<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut BenchmarkRecord),
    {
        match self.results.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_status(&mut self, id: &str, status: ProcessingStatus) {
        match self.statuses.iter_mut().find(|(i, _)| i == id) {
            Some((_, slot)) => *slot = status,
            None => self.statuses.push((id.to_string(), status)),
        }
    }

    /// Remove the projection of `id` only; other submissions keep theirs.
    pub(crate) fn clear_status(&mut self, id: &str) -> bool {
        let before = self.statuses.len();
        self.statuses.retain(|(i, _)| i != id);
        self.statuses.len() != before
    }

    pub(crate) fn status_of(&self, id: &str) -> Option<&ProcessingStatus> {
        self.statuses.iter().find(|(i, _)| i == id).map(|(_, s)| s)
    }

    /// Projection of the most recently started submission that still has one.
    pub(crate) fn current_status(&self) -> Option<&ProcessingStatus> {
        self.statuses.last().map(|(_, s)| s)
    }

    pub(crate) fn results(&self) -> &[BenchmarkRecord] {
        &self.results
    }

    pub(crate) fn is_processing(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            results: self.results.clone(),
            status: self.current_status().cloned(),
            is_processing: self.is_processing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileType, RecordStatus};

    fn record(name: &str) -> BenchmarkRecord {
        BenchmarkRecord::pending(FileType::Csv, name, 100)
    }

    #[test]
    fn test_results_are_newest_first() {
        let mut state = DashboardState::default();
        state.begin(record("a.csv"));
        state.begin(record("b.csv"));
        let names: Vec<&str> = state.results().iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.csv", "a.csv"]);
        assert!(state.is_processing());
    }

    #[test]
    fn test_update_targets_record_by_id() {
        let mut state = DashboardState::default();
        let a = record("a.csv");
        let a_id = a.id.clone();
        state.begin(a);
        state.begin(record("b.csv"));
        assert!(state.update_record(&a_id, |r| r.status = RecordStatus::Completed));
        assert_eq!(state.results()[1].status, RecordStatus::Completed);
        assert_eq!(state.results()[0].status, RecordStatus::Pending);
        assert!(!state.update_record("missing", |r| r.status = RecordStatus::Error));
    }

    #[test]
    fn test_clearing_older_status_keeps_newer() {
        let mut state = DashboardState::default();
        state.set_status("first", ProcessingStatus::completed());
        state.set_status("second", ProcessingStatus::processing_spark());
        assert_eq!(state.current_status(), Some(&ProcessingStatus::processing_spark()));

        assert!(state.clear_status("first"));
        assert_eq!(state.current_status(), Some(&ProcessingStatus::processing_spark()));
        assert!(!state.clear_status("first"));

        // Updates keep the start order.
        state.set_status("third", ProcessingStatus::joining());
        state.set_status("second", ProcessingStatus::processing_pandas());
        assert_eq!(state.current_status(), Some(&ProcessingStatus::joining()));
    }

    #[test]
    fn test_finish_clears_in_flight() {
        let mut state = DashboardState::default();
        let r = record("a.csv");
        let id = r.id.clone();
        state.begin(r);
        state.finish(&id);
        assert!(!state.is_processing());
        assert!(!state.snapshot().is_processing);
    }
}
