use crate::{
    ast::expr::{BinaryOperator, Expr},
    renderer::Render,
};

impl Render for Expr {
    fn render(&self, r: &mut super::Renderer) {
        match self {
            Expr::Identifier(ident) => {
                if let Some(qualifier) = &ident.qualifier {
                    r.sql.push_str(&r.dialect.quote_identifier(qualifier));
                    r.sql.push('.');
                }
                r.sql.push_str(&r.dialect.quote_identifier(&ident.name));
            }
            Expr::Value(value) => r.add_param(value.clone()),
            Expr::Literal(raw) => r.sql.push_str(raw),
            Expr::Excluded(column) => {
                r.sql.push_str("EXCLUDED.");
                r.sql.push_str(&r.dialect.quote_identifier(column));
            }
            Expr::Now => r.sql.push_str("NOW()"),
            Expr::FuncCall { name, args } => {
                r.sql.push_str(name);
                r.sql.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    arg.render(r);
                }
                r.sql.push(')');
            }
            Expr::Tuple(items) => {
                r.sql.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    item.render(r);
                }
                r.sql.push(')');
            }
            Expr::BinaryOp(op) => {
                r.sql.push('(');
                op.left.render(r);
                r.sql.push(' ');
                r.sql.push_str(match op.op {
                    BinaryOperator::Eq => "=",
                    BinaryOperator::Gt => ">",
                    BinaryOperator::GtEq => ">=",
                    BinaryOperator::And => "AND",
                });
                r.sql.push(' ');
                op.right.render(r);
                r.sql.push(')');
            }
            Expr::InSubquery { columns, query } => {
                r.sql.push('(');
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    column.render(r);
                }
                r.sql.push_str(") IN (");
                query.render(r);
                r.sql.push(')');
            }
        }
    }
}
