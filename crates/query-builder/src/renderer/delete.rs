use crate::{ast::delete::Delete, renderer::Render};

impl Render for Delete {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("DELETE FROM ");
        r.render_table_ref(&self.table);
        if let Some(filter) = &self.filter {
            r.sql.push_str(" WHERE ");
            filter.render(r);
        }
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::common::TableRef,
        builder::delete::DeleteBuilder,
        renderer::render_postgres,
    };

    #[test]
    fn test_render_delete_all() {
        let delete = DeleteBuilder::new(TableRef::qualified("idr", "claim_type_code")).build();
        let (sql, params) = render_postgres(&delete);
        assert_eq!(sql, r#"DELETE FROM "idr"."claim_type_code";"#);
        assert!(params.is_empty());
    }
}
