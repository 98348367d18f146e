use serde::{Deserialize, Serialize};
use std::fmt;

/// Creation audit column present on every destination table.
pub const CREATED_TS_COL: &str = "bfd_created_ts";
/// Update audit column present on mutable destination tables only.
pub const UPDATED_TS_COL: &str = "bfd_updated_ts";

/// A schema-qualified table name. Identifiers only ever originate from
/// `TableModel` implementations compiled into this crate, never from
/// external input; the query builder still quotes them when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId {
    pub schema: String,
    pub name: String,
}

impl TableId {
    pub fn new(schema: &str, name: &str) -> Self {
        TableId {
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Whether a run is the first full scan of a source table or a later
/// delta scan resumed from persisted progress. The two read different
/// batch-timestamp columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadKind {
    Initial,
    Incremental,
}

/// A "last updated" tracking table kept alongside a denormalized parent
/// so downstream consumers can detect staleness. When a child table's
/// batch lands, the tracking row for every parent key in the batch gets
/// its timestamp bumped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessTarget {
    pub table: TableId,
    pub column: String,
    /// Join key present in both the staged batch and the tracking table.
    pub key: Vec<String>,
}

/// Static description of one destination table: which columns the loader
/// may write, how conflicts resolve, and which columns drive progress.
/// Implementations are stateless unit structs.
pub trait TableModel: Send + Sync {
    fn table(&self) -> TableId;

    /// Columns the loader writes. Excludes server-computed columns and the
    /// `bfd_*` audit columns. The loader sorts this list before use so
    /// COPY column order is deterministic.
    fn insert_keys(&self) -> Vec<String>;

    /// Server-computed columns (generated surrogate keys and the like),
    /// excluded from the staging table.
    fn computed_keys(&self) -> Vec<String> {
        Vec::new()
    }

    /// Conflict target for the merge.
    fn unique_key(&self) -> Vec<String>;

    /// Source-side update timestamp column. Presence marks the table as
    /// mutable: conflicts update in place and bump `bfd_updated_ts`.
    /// Absence marks it immutable: conflicts do nothing.
    fn update_timestamp_col(&self) -> Option<String> {
        None
    }

    /// Columns whose maximum marks progress for the given load kind.
    fn batch_timestamp_cols(&self, kind: LoadKind) -> Vec<String>;

    /// Tie-break id recorded next to the progress timestamp when several
    /// rows share it.
    fn batch_id_col(&self) -> Option<String> {
        None
    }

    /// Column the extractor pages on when timestamps tie: the declared
    /// batch id, falling back to a single-column unique key. Paging on
    /// the timestamp alone would drop rows that share the last row's
    /// timestamp across a page boundary.
    fn cursor_id_col(&self) -> Option<String> {
        self.batch_id_col().or_else(|| {
            let mut unique_key = self.unique_key();
            if unique_key.len() == 1 {
                unique_key.pop()
            } else {
                None
            }
        })
    }

    /// Replace the whole table (delete + reload in one transaction)
    /// instead of merging. Used for small reference-code tables.
    fn should_replace(&self) -> bool {
        false
    }

    fn staleness_target(&self) -> Option<StalenessTarget> {
        None
    }

    /// Insert keys in the deterministic order the loader stages and
    /// copies them.
    fn sorted_insert_keys(&self) -> Vec<String> {
        let mut keys = self.insert_keys();
        keys.sort();
        keys
    }

    fn is_mutable(&self) -> bool {
        self.update_timestamp_col().is_some()
    }
}
