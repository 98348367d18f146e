//! Defines the AST for the COPY statement.

use crate::ast::common::TableRef;

/// `COPY <t> (<cols>) FROM STDIN [WITH (...)]`. The loader only ever
/// streams into staging tables, so no TO variant is modeled.
#[derive(Debug, Clone)]
pub struct Copy {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub options: Vec<CopyOption>,
}

#[derive(Debug, Clone)]
pub struct CopyOption {
    pub key: String,
    pub value: Option<String>,
}
