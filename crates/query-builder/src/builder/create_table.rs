use crate::ast::{common::TableRef, create_table::CreateTableAs, select::Select};

#[derive(Debug, Clone)]
pub struct CreateTableAsBuilder {
    ast: CreateTableAs,
}

impl CreateTableAsBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: CreateTableAs {
                table,
                ..Default::default()
            },
        }
    }

    pub fn temp(mut self) -> Self {
        self.ast.temp = true;
        self
    }

    pub fn on_commit_drop(mut self) -> Self {
        self.ast.on_commit_drop = true;
        self
    }

    pub fn query(mut self, query: Select) -> Self {
        self.ast.query = query;
        self
    }

    pub fn with_no_data(mut self) -> Self {
        self.ast.with_no_data = true;
        self
    }

    pub fn build(self) -> CreateTableAs {
        self.ast
    }
}
