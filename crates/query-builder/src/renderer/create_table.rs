use crate::{ast::create_table::CreateTableAs, renderer::Render};

impl Render for CreateTableAs {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("CREATE ");
        if self.temp {
            r.sql.push_str("TEMP ");
        }
        r.sql.push_str("TABLE ");
        r.render_table_ref(&self.table);
        if self.on_commit_drop {
            r.sql.push_str(" ON COMMIT DROP");
        }
        r.sql.push_str(" AS ");
        self.query.render(r);
        if self.with_no_data {
            r.sql.push_str(" WITH NO DATA");
        }
        r.sql.push(';');
    }
}
