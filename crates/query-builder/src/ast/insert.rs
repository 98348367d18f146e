//! Defines the AST for an INSERT statement.

use crate::ast::{common::TableRef, expr::Expr, select::Select};

/// Either a single-row `VALUES` insert (progress bookkeeping) or an
/// `INSERT ... SELECT` (the staged-batch merge), with an optional
/// ON CONFLICT clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    /// One row of values. Bulk ingestion goes through COPY, so the
    /// multi-row VALUES form is never needed.
    pub row: Option<Vec<Expr>>,
    /// SELECT used as the data source instead of a VALUES row.
    pub select: Option<Select>,
    pub on_conflict: Option<OnConflict>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    pub columns: Vec<String>,
    pub action: ConflictAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate {
        assignments: Vec<ConflictAssignment>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConflictAssignment {
    pub column: String,
    pub value: Expr,
}
