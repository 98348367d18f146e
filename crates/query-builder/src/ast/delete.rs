//! Defines the AST for a DELETE statement.

use crate::ast::{common::TableRef, expr::Expr};

/// DELETE with no filter clears the whole table. Unlike TRUNCATE this is
/// transactional row deletion, so a concurrent reader inside the same
/// replace transaction never observes an empty table.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub filter: Option<Expr>,
}
