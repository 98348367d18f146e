use crate::ast::select::Select;
use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub qualifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Gt,
    GtEq,
    And,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Ident),
    /// Binds as a positional parameter.
    Value(Value),
    /// Raw SQL fragment, used sparingly for things the AST does not model.
    Literal(String),
    /// `EXCLUDED."col"` inside an ON CONFLICT DO UPDATE clause.
    Excluded(String),
    /// `NOW()`.
    Now,
    /// Function call over rendered arguments, e.g. `GREATEST(a, b)`.
    FuncCall { name: String, args: Vec<Expr> },
    /// Row constructor, e.g. `("idr_updt_ts", "clm_uniq_id")`.
    Tuple(Vec<Expr>),
    BinaryOp(Box<BinaryOp>),
    /// `(<columns>) IN (<subquery>)`.
    InSubquery {
        columns: Vec<Expr>,
        query: Box<Select>,
    },
}

impl Expr {
    pub fn eq(left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        }))
    }

    pub fn gt(left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp {
            left,
            op: BinaryOperator::Gt,
            right,
        }))
    }

    pub fn gt_eq(left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp {
            left,
            op: BinaryOperator::GtEq,
            right,
        }))
    }

    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        }))
    }
}
