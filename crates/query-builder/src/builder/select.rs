use crate::ast::{
    common::{OrderDir, TableRef},
    expr::Expr,
    select::{FromClause, OrderByExpr, Select},
};

#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    ast: Select,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, expr: Expr) -> Self {
        self.ast.columns.push(expr);
        self
    }

    pub fn columns(mut self, exprs: Vec<Expr>) -> Self {
        self.ast.columns.extend(exprs);
        self
    }

    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> Self {
        self.ast.from = Some(FromClause {
            table,
            alias: alias.map(|a| a.to_string()),
        });
        self
    }

    pub fn filter(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.ast.order_by.push(OrderByExpr { expr, direction });
        self
    }

    pub fn limit(mut self, expr: Expr) -> Self {
        self.ast.limit = Some(expr);
        self
    }

    pub fn for_update(mut self) -> Self {
        self.ast.for_update = true;
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}
