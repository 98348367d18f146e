//! Defines the AST for CREATE TABLE ... AS SELECT.

use crate::ast::{common::TableRef, select::Select};

/// `CREATE [TEMP] TABLE <t> [ON COMMIT DROP] AS <query> [WITH NO DATA]`.
///
/// With `WITH NO DATA` this clones the column structure of the selected
/// columns without copying rows, which is how staging tables pick up the
/// destination's column types minus the excluded columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTableAs {
    pub table: TableRef,
    pub temp: bool,
    pub on_commit_drop: bool,
    pub query: Select,
    pub with_no_data: bool,
}
