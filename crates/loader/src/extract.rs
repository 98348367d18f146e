//! Batch sources. The loader pulls from an [`Extractor`] so the merge
//! pipeline is identical for a live IDR connection and canned local data.

use crate::{error::LoadError, progress::batch_progress, statements::extraction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use connectors::postgres::adapter::PgAdapter;
use model::{
    config::LoaderConfig,
    progress::{LoadProgress, min_load_ts},
    records::row::Row,
    schema::{LoadKind, TableModel},
};
use std::collections::VecDeque;
use tracing::debug;

#[async_trait]
pub trait Extractor: Send {
    /// The next batch, or `None` once the source is exhausted.
    async fn next_batch(&mut self) -> Result<Option<Vec<Row>>, LoadError>;
}

/// Canned batches for local runs and tests.
pub struct MemoryExtractor {
    batches: VecDeque<Vec<Row>>,
}

impl MemoryExtractor {
    pub fn new(batches: Vec<Vec<Row>>) -> Self {
        MemoryExtractor {
            batches: batches.into(),
        }
    }

    /// Splits a flat row list into `batch_size` chunks.
    pub fn from_rows(rows: Vec<Row>, batch_size: usize) -> Self {
        let batches = rows
            .chunks(batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        MemoryExtractor { batches }
    }
}

#[async_trait]
impl Extractor for MemoryExtractor {
    async fn next_batch(&mut self) -> Result<Option<Vec<Row>>, LoadError> {
        Ok(self.batches.pop_front())
    }
}

/// Where a resumed run starts reading and whether the first page re-reads
/// the cursor row itself. An interrupted batch window resumes inclusively
/// because rows sharing the committed mark's timestamp may not all have
/// landed; a completed window advances strictly past it.
pub fn resume_cursor(progress: Option<&LoadProgress>) -> ((DateTime<Utc>, i64), bool) {
    match progress {
        Some(p) => ((p.last_ts, p.last_id), !p.is_complete()),
        None => ((min_load_ts(), 0), true),
    }
}

/// Replace tables reload whole every run: the merge starts by clearing
/// the destination, so extracting only the delta past a persisted mark
/// would leave the table holding nothing but that delta.
pub fn effective_progress<'p>(
    model: &dyn TableModel,
    progress: Option<&'p LoadProgress>,
) -> Option<&'p LoadProgress> {
    if model.should_replace() {
        None
    } else {
        progress
    }
}

/// Keyset-paginated extraction from a source Postgres connection. Each
/// page advances the cursor to the high-water mark of its own last row,
/// so a crash between pages loses at most one page of re-reads.
pub struct PgExtractor<'a> {
    adapter: &'a PgAdapter,
    model: &'a dyn TableModel,
    kind: LoadKind,
    batch_size: usize,
    min_ts: Option<DateTime<Utc>>,
    cursor: (DateTime<Utc>, i64),
    inclusive: bool,
    done: bool,
}

impl<'a> PgExtractor<'a> {
    pub fn new(
        adapter: &'a PgAdapter,
        model: &'a dyn TableModel,
        kind: LoadKind,
        config: &LoaderConfig,
        progress: Option<&LoadProgress>,
    ) -> Self {
        let (cursor, inclusive) = resume_cursor(effective_progress(model, progress));
        let min_ts = match kind {
            // Initial scans walk everything; incremental scans never
            // revisit history before the configured floor.
            LoadKind::Initial => None,
            LoadKind::Incremental => config
                .min_transaction_date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc()),
        };
        PgExtractor {
            adapter,
            model,
            kind,
            batch_size: config.batch_size,
            min_ts,
            cursor,
            inclusive,
            done: false,
        }
    }
}

#[async_trait]
impl Extractor for PgExtractor<'_> {
    async fn next_batch(&mut self) -> Result<Option<Vec<Row>>, LoadError> {
        if self.done {
            return Ok(None);
        }

        let (sql, params) = extraction(
            self.model,
            self.kind,
            self.cursor,
            self.inclusive,
            self.batch_size as i64,
            self.min_ts,
        );
        let rows = self.adapter.query_rows(&sql, params).await?;
        if rows.is_empty() {
            self.done = true;
            return Ok(None);
        }

        if let Some(last) = rows.last() {
            self.cursor = batch_progress(self.model, self.kind, last)?;
        }
        // Later pages chase rows strictly past what this page returned.
        self.inclusive = false;
        if rows.len() < self.batch_size {
            self.done = true;
        }

        debug!(
            table = %self.model.table(),
            rows = rows.len(),
            cursor_ts = %self.cursor.0,
            "extracted batch"
        );
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use model::{
        core::{identifiers::Partition, value::Value},
        progress::incomplete_batch_ts,
        schema::TableId,
    };

    #[tokio::test]
    async fn memory_extractor_chunks_and_drains() {
        let rows: Vec<Row> = (0..5)
            .map(|i| Row::from_pairs("t", vec![("id", Value::Int(i))]))
            .collect();
        let mut extractor = MemoryExtractor::from_rows(rows, 2);

        assert_eq!(extractor.next_batch().await.unwrap().unwrap().len(), 2);
        assert_eq!(extractor.next_batch().await.unwrap().unwrap().len(), 2);
        assert_eq!(extractor.next_batch().await.unwrap().unwrap().len(), 1);
        assert!(extractor.next_batch().await.unwrap().is_none());
    }

    #[test]
    fn fresh_table_resumes_inclusively_from_the_sentinel() {
        let (cursor, inclusive) = resume_cursor(None);
        assert_eq!(cursor, (min_load_ts(), 0));
        assert!(inclusive);
    }

    #[test]
    fn interrupted_window_rereads_the_cursor_row() {
        let mut progress = LoadProgress::starting(
            &TableId::new("idr", "claim"),
            Partition::new("0"),
            Utc::now(),
        );
        progress.last_ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        progress.last_id = 40;
        progress.batch_complete_ts = incomplete_batch_ts();

        let (cursor, inclusive) = resume_cursor(Some(&progress));
        assert_eq!(cursor, (progress.last_ts, 40));
        assert!(inclusive);
    }

    #[test]
    fn replace_tables_ignore_persisted_progress() {
        use model::tables::ClaimTypeCodeTable;

        let mut progress = LoadProgress::starting(
            &TableId::new("idr", "claim_type_code"),
            Partition::new("0"),
            Utc::now(),
        );
        progress.last_ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        progress.batch_complete_ts = Utc::now();

        // A delta scan would leave the cleared destination holding only
        // the delta, so the reload always starts from the sentinel.
        assert!(effective_progress(&ClaimTypeCodeTable, Some(&progress)).is_none());
        let (cursor, inclusive) =
            resume_cursor(effective_progress(&ClaimTypeCodeTable, Some(&progress)));
        assert_eq!(cursor, (min_load_ts(), 0));
        assert!(inclusive);
    }

    #[test]
    fn completed_window_advances_strictly_past_the_mark() {
        let mut progress = LoadProgress::starting(
            &TableId::new("idr", "claim"),
            Partition::new("0"),
            Utc::now(),
        );
        progress.last_ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        progress.last_id = 40;
        progress.batch_complete_ts = Utc::now();

        let (_, inclusive) = resume_cursor(Some(&progress));
        assert!(!inclusive);
    }
}
