use crate::{ast::copy::Copy, renderer::Render};

impl Render for Copy {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("COPY ");
        r.render_table_ref(&self.table);

        if !self.columns.is_empty() {
            r.sql.push_str(" (");
            let cols: Vec<String> = self
                .columns
                .iter()
                .map(|col| r.dialect.quote_identifier(col))
                .collect();
            r.sql.push_str(&cols.join(", "));
            r.sql.push(')');
        }

        r.sql.push_str(" FROM STDIN");

        if !self.options.is_empty() {
            r.sql.push_str(" WITH (");
            for (i, option) in self.options.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                r.sql.push_str(&option.key);
                if let Some(value) = &option.value {
                    r.sql.push(' ');
                    r.sql.push_str(value);
                }
            }
            r.sql.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::common::TableRef,
        builder::copy::CopyBuilder,
        renderer::render_postgres,
    };

    #[test]
    fn test_render_copy_from_stdin() {
        let copy = CopyBuilder::new(TableRef::bare("beneficiary_stage"))
            .columns(&["bene_sk", "bene_1st_name"])
            .option("FORMAT", Some("TEXT"))
            .build();

        let (sql, params) = render_postgres(&copy);
        assert_eq!(
            sql,
            r#"COPY "beneficiary_stage" ("bene_sk", "bene_1st_name") FROM STDIN WITH (FORMAT TEXT)"#
        );
        assert!(params.is_empty());
    }
}
