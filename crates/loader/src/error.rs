use connectors::error::{ConnectorError, DbError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A model declared a batch-timestamp column the extracted row does
    /// not carry (or carries as NULL). This is a logic error in the table
    /// model, not recoverable data skew.
    #[error("Row from {table} has no usable batch timestamp in {column}")]
    MissingBatchTimestamp { table: String, column: String },
}
