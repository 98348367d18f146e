use crate::ast::{common::TableRef, delete::Delete, expr::Expr};

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    ast: Delete,
}

impl DeleteBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Delete {
                table,
                filter: None,
            },
        }
    }

    pub fn filter(mut self, condition: Expr) -> Self {
        self.ast.filter = Some(condition);
        self
    }

    pub fn build(self) -> Delete {
        self.ast
    }
}
