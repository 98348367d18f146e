use crate::{core::identifiers::Partition, schema::TableId};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Control table holding one resume-point row per (table, partition).
pub fn progress_table() -> TableId {
    TableId::new("idr", "load_progress")
}

/// Default for `last_ts` before anything has loaded: far enough in the
/// past that every source row sorts after it.
pub fn min_load_ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap()
}

/// Sentinel for `batch_complete_ts` meaning "not yet complete". A crash
/// mid-run leaves this value in place, telling the next run to resume the
/// same logical batch window instead of skipping past it.
pub fn incomplete_batch_ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0).unwrap()
}

/// Persisted resume point for one (table, partition) pair. Created on
/// first run, mutated at batch start and batch end, never deleted by the
/// loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProgress {
    pub table_name: String,
    pub batch_partition: Partition,
    /// Maximum source timestamp successfully committed.
    pub last_ts: DateTime<Utc>,
    /// Tie-break id at `last_ts`.
    pub last_id: i64,
    pub job_start_ts: DateTime<Utc>,
    pub batch_start_ts: DateTime<Utc>,
    pub batch_complete_ts: DateTime<Utc>,
}

impl LoadProgress {
    /// Fresh progress row for a table that has never loaded.
    pub fn starting(table: &TableId, partition: Partition, job_start: DateTime<Utc>) -> Self {
        LoadProgress {
            table_name: table.to_string(),
            batch_partition: partition,
            last_ts: min_load_ts(),
            last_id: 0,
            job_start_ts: job_start,
            batch_start_ts: job_start,
            batch_complete_ts: incomplete_batch_ts(),
        }
    }

    /// True once a run has marked the batch window fully committed.
    pub fn is_complete(&self) -> bool {
        self.batch_complete_ts != incomplete_batch_ts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_progress_starts_incomplete_at_min_ts() {
        let progress = LoadProgress::starting(
            &TableId::new("idr", "beneficiary"),
            Partition::new("part-0"),
            Utc::now(),
        );
        assert_eq!(progress.last_ts, min_load_ts());
        assert_eq!(progress.last_id, 0);
        assert!(!progress.is_complete());
    }

    #[test]
    fn completion_is_anything_but_the_sentinel() {
        let mut progress = LoadProgress::starting(
            &TableId::new("idr", "claim"),
            Partition::new("part-a"),
            Utc::now(),
        );
        progress.batch_complete_ts = Utc::now();
        assert!(progress.is_complete());
    }
}
