use connectors::error::{ConnectorError, DbError};
use loader::error::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid load mode: {0} (expected \"local\" or \"idr\")")]
    InvalidLoadMode(String),
}
