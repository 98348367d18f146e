use crate::{
    ast::insert::{ConflictAction, Insert},
    renderer::Render,
};

impl Render for Insert {
    fn render(&self, r: &mut super::Renderer) {
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            r.sql.push_str(&r.dialect.quote_identifier(column));
        }
        r.sql.push(')');

        if let Some(row) = &self.row {
            r.sql.push_str(" VALUES (");
            for (i, val) in row.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                val.render(r);
            }
            r.sql.push(')');
        } else if let Some(select) = &self.select {
            r.sql.push(' ');
            select.render(r);
        }

        match &self.on_conflict {
            Some(on_conflict) if !on_conflict.columns.is_empty() => {
                r.sql.push_str(" ON CONFLICT (");
                for (i, column) in on_conflict.columns.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    r.sql.push_str(&r.dialect.quote_identifier(column));
                }
                r.sql.push(')');

                match &on_conflict.action {
                    ConflictAction::DoUpdate { assignments } if !assignments.is_empty() => {
                        r.sql.push_str(" DO UPDATE SET ");
                        for (i, assignment) in assignments.iter().enumerate() {
                            if i > 0 {
                                r.sql.push_str(", ");
                            }
                            r.sql
                                .push_str(&r.dialect.quote_identifier(&assignment.column));
                            r.sql.push_str(" = ");
                            assignment.value.render(r);
                        }
                    }
                    // An empty update list degrades to DO NOTHING.
                    _ => r.sql.push_str(" DO NOTHING"),
                }
            }
            _ => {}
        }
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{
            common::TableRef,
            expr::Expr,
            insert::ConflictAssignment,
        },
        builder::{insert::InsertBuilder, select::SelectBuilder},
        excluded, qual_ident,
        renderer::render_postgres,
        value,
    };
    use model::core::value::Value;

    #[test]
    fn test_render_values_insert_with_params() {
        let insert = InsertBuilder::new(TableRef::qualified("idr", "load_progress"))
            .columns(&["table_name", "last_id"])
            .row(vec![
                value(Value::String("idr.beneficiary".to_string())),
                value(Value::Int(0)),
            ])
            .build();

        let (sql, params) = render_postgres(&insert);
        assert_eq!(
            sql,
            r#"INSERT INTO "idr"."load_progress" ("table_name", "last_id") VALUES ($1, $2);"#
        );
        assert_eq!(
            params,
            vec![Value::String("idr.beneficiary".to_string()), Value::Int(0)]
        );
    }

    #[test]
    fn test_render_insert_select_on_conflict_do_update() {
        let select = SelectBuilder::new()
            .column(qual_ident("s", "bene_sk"))
            .column(qual_ident("s", "bene_1st_name"))
            .from(TableRef::bare("beneficiary_stage"), Some("s"))
            .build();

        let insert = InsertBuilder::new(TableRef::qualified("idr", "beneficiary"))
            .columns(&["bene_sk", "bene_1st_name"])
            .select(select)
            .on_conflict_do_update(
                &["bene_sk"],
                vec![
                    ConflictAssignment {
                        column: "bene_1st_name".to_string(),
                        value: excluded("bene_1st_name"),
                    },
                    ConflictAssignment {
                        column: "bfd_updated_ts".to_string(),
                        value: Expr::Now,
                    },
                ],
            )
            .build();

        let (sql, params) = render_postgres(&insert);
        assert_eq!(
            sql,
            concat!(
                "INSERT INTO \"idr\".\"beneficiary\" (\"bene_sk\", \"bene_1st_name\") ",
                "SELECT \"s\".\"bene_sk\", \"s\".\"bene_1st_name\" FROM \"beneficiary_stage\" AS \"s\" ",
                "ON CONFLICT (\"bene_sk\") DO UPDATE SET \"bene_1st_name\" = EXCLUDED.\"bene_1st_name\", ",
                "\"bfd_updated_ts\" = NOW();"
            )
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_render_insert_on_conflict_do_nothing() {
        let select = SelectBuilder::new()
            .column(qual_ident("s", "clm_type_cd"))
            .from(TableRef::bare("claim_type_code_stage"), Some("s"))
            .build();

        let insert = InsertBuilder::new(TableRef::qualified("idr", "claim_type_code"))
            .columns(&["clm_type_cd"])
            .select(select)
            .on_conflict_do_nothing(&["clm_type_cd"])
            .build();

        let (sql, _) = render_postgres(&insert);
        assert!(sql.ends_with(r#"ON CONFLICT ("clm_type_cd") DO NOTHING;"#));
    }
}
