use crate::{ast::update::Update, renderer::Render};

impl Render for Update {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("UPDATE ");
        r.render_table_ref(&self.table);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }

        r.sql.push_str(" SET ");
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            r.sql
                .push_str(&r.dialect.quote_identifier(&assignment.column));
            r.sql.push_str(" = ");
            assignment.value.render(r);
        }

        if let Some(filter) = &self.filter {
            r.sql.push_str(" WHERE ");
            filter.render(r);
        }
        r.sql.push(';');
    }
}
