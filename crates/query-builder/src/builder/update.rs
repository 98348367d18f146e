use crate::ast::{
    common::TableRef,
    expr::Expr,
    update::{Assignment, Update},
};

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    ast: Update,
}

impl UpdateBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Update {
                table,
                alias: None,
                assignments: Vec::new(),
                filter: None,
            },
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.ast.alias = Some(alias.to_string());
        self
    }

    pub fn set(mut self, column: &str, value: Expr) -> Self {
        self.ast.assignments.push(Assignment {
            column: column.to_string(),
            value,
        });
        self
    }

    pub fn filter(mut self, condition: Expr) -> Self {
        self.ast.filter = Some(condition);
        self
    }

    pub fn build(self) -> Update {
        self.ast
    }
}
