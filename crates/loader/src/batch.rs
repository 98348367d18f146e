//! The per-table load pipeline: stage a batch through COPY, merge it
//! into the destination, and commit it atomically with the progress mark.

use crate::{
    error::LoadError,
    extract::Extractor,
    progress::{ProgressTracker, batch_progress},
    statements::MergePlan,
};
use connectors::postgres::adapter::{PgAdapter, copy_rows, exec_tx};
use model::{
    config::LoaderConfig,
    core::identifiers::Partition,
    schema::{LoadKind, TableModel},
};
use tracing::{debug, info};

/// Drives one table's load end to end. Each batch runs in its own
/// transaction: temp staging table, COPY, optional whole-table delete,
/// merge, optional staleness bump, progress advance, commit. A crash
/// between batches leaves the destination and the progress mark
/// consistent with each other.
pub struct BatchLoader<'a, E: Extractor> {
    adapter: &'a mut PgAdapter,
    extractor: E,
    model: &'a dyn TableModel,
    kind: LoadKind,
    partition: Partition,
    config: LoaderConfig,
}

impl<'a, E: Extractor> BatchLoader<'a, E> {
    pub fn new(
        adapter: &'a mut PgAdapter,
        extractor: E,
        model: &'a dyn TableModel,
        kind: LoadKind,
        partition: Partition,
        config: LoaderConfig,
    ) -> Self {
        BatchLoader {
            adapter,
            extractor,
            model,
            kind,
            partition,
            config,
        }
    }

    /// Loads every batch the extractor yields. Returns whether anything
    /// was loaded at all.
    pub async fn load(&mut self) -> Result<bool, LoadError> {
        let plan = MergePlan::new(self.model);
        let tracker = ProgressTracker::new(self.model, self.partition.clone(), &self.config);
        tracker.init(&*self.adapter).await?;

        let mut batches = 0u64;
        let mut total_rows = 0u64;

        while let Some(batch) = self.extractor.next_batch().await? {
            if batch.is_empty() {
                continue;
            }

            // The mark comes from the batch itself, not the clock, so a
            // re-run after a crash re-derives the same resume point.
            // Replace tables reload whole every run and never advance a
            // resume cursor.
            let mark = match batch.last() {
                Some(last) if tracker.enabled() && !self.model.should_replace() => {
                    Some(batch_progress(self.model, self.kind, last)?)
                }
                _ => None,
            };

            let tx = self.adapter.transaction().await?;
            exec_tx(&tx, &plan.create_staging).await?;
            copy_rows(&tx, &plan.copy, &plan.columns, &batch).await?;
            // Replace tables clear out once, in the first batch's
            // transaction; later batches append to the reload.
            if batches == 0 {
                if let Some(delete) = &plan.replace_delete {
                    exec_tx(&tx, delete).await?;
                }
            }
            exec_tx(&tx, &plan.merge).await?;
            if let Some(staleness) = &plan.staleness {
                exec_tx(&tx, staleness).await?;
            }
            if let Some((last_ts, last_id)) = mark {
                tracker.advance(&tx, last_ts, last_id).await?;
            }
            tx.commit().await?;

            batches += 1;
            total_rows += batch.len() as u64;
            debug!(
                table = %self.model.table(),
                batch = batches,
                rows = batch.len(),
                "batch committed"
            );
        }

        tracker.mark_complete(&*self.adapter).await?;
        info!(
            table = %self.model.table(),
            partition = %self.partition,
            batches,
            rows = total_rows,
            "load finished"
        );
        Ok(total_rows > 0)
    }
}
