use crate::ast::{
    common::TableRef,
    expr::Expr,
    insert::{ConflictAction, ConflictAssignment, Insert, OnConflict},
    select::Select,
};

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    ast: Insert,
}

impl InsertBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: Insert {
                table,
                ..Default::default()
            },
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.ast.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn column_names(mut self, columns: &[String]) -> Self {
        self.ast.columns = columns.to_vec();
        self
    }

    pub fn row(mut self, values: Vec<Expr>) -> Self {
        self.ast.row = Some(values);
        self
    }

    pub fn select(mut self, select: Select) -> Self {
        self.ast.select = Some(select);
        self
    }

    pub fn on_conflict_do_nothing(mut self, columns: &[&str]) -> Self {
        self.ast.on_conflict = Some(OnConflict {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            action: ConflictAction::DoNothing,
        });
        self
    }

    pub fn on_conflict_do_update(
        mut self,
        columns: &[&str],
        assignments: Vec<ConflictAssignment>,
    ) -> Self {
        self.ast.on_conflict = Some(OnConflict {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            action: ConflictAction::DoUpdate { assignments },
        });
        self
    }

    pub fn build(self) -> Insert {
        self.ast
    }
}
