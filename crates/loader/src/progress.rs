//! Progress bookkeeping: the per-(table, partition) resume row and the
//! pure arithmetic that derives a batch's high-water mark from its rows.

use crate::{
    error::LoadError,
    statements::{progress_advance, progress_complete, progress_fetch, progress_init},
};
use chrono::{DateTime, Utc};
use connectors::postgres::adapter::{PgAdapter, exec_params_tx};
use model::{
    config::LoaderConfig,
    core::identifiers::Partition,
    progress::LoadProgress,
    records::row::Row,
    schema::{LoadKind, TableModel},
};
use tokio_postgres::Transaction;
use tracing::{debug, info};

/// Reads one progress row back out of the control table.
pub async fn fetch_progress(
    adapter: &PgAdapter,
    table_name: &str,
    partition: &Partition,
) -> Result<Option<LoadProgress>, LoadError> {
    let (sql, params) = progress_fetch(table_name, partition);
    let row = match adapter.query_opt(&sql, params).await? {
        Some(row) => row,
        None => return Ok(None),
    };

    let partition: String = row.try_get("batch_partition")?;
    Ok(Some(LoadProgress {
        table_name: row.try_get("table_name")?,
        batch_partition: Partition::new(partition),
        last_ts: row.try_get("last_ts")?,
        last_id: row.try_get("last_id")?,
        job_start_ts: row.try_get("job_start_ts")?,
        batch_start_ts: row.try_get("batch_start_ts")?,
        batch_complete_ts: row.try_get("batch_complete_ts")?,
    }))
}

/// High-water mark contributed by one extracted row: the maximum of the
/// model's batch-timestamp columns (dates widen to UTC midnight), plus
/// the tie-break id. A row with no usable timestamp is a model bug, not
/// data to skip silently.
pub fn batch_progress(
    model: &dyn TableModel,
    kind: LoadKind,
    row: &Row,
) -> Result<(DateTime<Utc>, i64), LoadError> {
    let cols = model.batch_timestamp_cols(kind);
    let ts = cols
        .iter()
        .filter_map(|col| row.value(col).as_timestamp())
        .max()
        .ok_or_else(|| LoadError::MissingBatchTimestamp {
            table: model.table().to_string(),
            column: cols.join(", "),
        })?;

    let id = match model.cursor_id_col() {
        Some(col) => row.value(&col).as_i64().unwrap_or(0),
        None => 0,
    };
    Ok((ts, id))
}

/// Owns the progress row for one (table, partition) across a run. When
/// tracking is off every method is a no-op, so callers never branch.
pub struct ProgressTracker {
    enabled: bool,
    table_name: String,
    partition: Partition,
    job_start: DateTime<Utc>,
}

impl ProgressTracker {
    pub fn new(model: &dyn TableModel, partition: Partition, config: &LoaderConfig) -> Self {
        ProgressTracker {
            enabled: config.track_progress(),
            table_name: model.table().to_string(),
            partition,
            job_start: Utc::now(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Upserts the starting row: fresh tables get the sentinel resume
    /// point, existing rows keep their committed mark and only refresh
    /// the run timestamps (including re-arming the incomplete sentinel).
    pub async fn init(&self, adapter: &PgAdapter) -> Result<(), LoadError> {
        if !self.enabled {
            return Ok(());
        }
        let starting = LoadProgress::starting(
            &model_table_id(&self.table_name),
            self.partition.clone(),
            self.job_start,
        );
        let (sql, params) = progress_init(&starting);
        adapter.exec_params(&sql, params).await?;
        info!(table = %self.table_name, partition = %self.partition, "progress initialized");
        Ok(())
    }

    /// Moves the committed mark inside the batch transaction, so data and
    /// mark land atomically.
    pub async fn advance(
        &self,
        tx: &Transaction<'_>,
        last_ts: DateTime<Utc>,
        last_id: i64,
    ) -> Result<(), LoadError> {
        if !self.enabled {
            return Ok(());
        }
        let (sql, params) = progress_advance(&self.table_name, &self.partition, last_ts, last_id);
        exec_params_tx(tx, &sql, params).await?;
        debug!(table = %self.table_name, %last_ts, last_id, "progress advanced");
        Ok(())
    }

    pub async fn mark_complete(&self, adapter: &PgAdapter) -> Result<(), LoadError> {
        if !self.enabled {
            return Ok(());
        }
        let (sql, params) = progress_complete(&self.table_name, &self.partition);
        adapter.exec_params(&sql, params).await?;
        info!(table = %self.table_name, partition = %self.partition, "batch window complete");
        Ok(())
    }

    /// The resume point for this run, or `None` when tracking is off or
    /// nothing has ever loaded.
    pub async fn fetch(&self, adapter: &PgAdapter) -> Result<Option<LoadProgress>, LoadError> {
        if !self.enabled {
            return Ok(None);
        }
        fetch_progress(adapter, &self.table_name, &self.partition).await
    }
}

// `LoadProgress::starting` wants a TableId but the tracker stores the
// rendered name; split it back apart rather than threading the model
// through every call site.
fn model_table_id(table_name: &str) -> model::schema::TableId {
    match table_name.split_once('.') {
        Some((schema, name)) => model::schema::TableId::new(schema, name),
        None => model::schema::TableId::new("", table_name),
    }
}
