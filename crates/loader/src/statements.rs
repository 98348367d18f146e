//! Statement plans for one table load: staging, COPY, merge, staleness
//! bump, and the progress-table upserts. Everything here is pure string
//! building over the query AST; execution lives in `batch`.

use chrono::{DateTime, Utc};
use model::{
    core::{identifiers::Partition, value::Value},
    progress::{LoadProgress, progress_table},
    schema::{LoadKind, TableModel, UPDATED_TS_COL},
};
use query_builder::{
    ast::{
        common::{OrderDir, TableRef},
        expr::Expr,
        insert::ConflictAssignment,
    },
    builder::{
        copy::CopyBuilder, create_table::CreateTableAsBuilder, delete::DeleteBuilder,
        insert::InsertBuilder, select::SelectBuilder, update::UpdateBuilder,
    },
    excluded, ident, qual_ident,
    renderer::render_postgres,
    value,
};

/// Session-local staging table name for a destination table. Temp tables
/// are schema-less, so the destination schema is folded into the name to
/// keep concurrent loads of same-named tables apart.
pub fn staging_table(model: &dyn TableModel) -> String {
    let table = model.table();
    format!("{}_{}_stage", table.schema, table.name)
}

/// The per-batch statements for one destination table, rendered once and
/// reused for every batch in the run.
pub struct MergePlan {
    /// Insert keys in staged/COPY order.
    pub columns: Vec<String>,
    pub staging_table: String,
    pub create_staging: String,
    pub copy: String,
    /// `DELETE FROM <dest>` for replace-mode tables, run inside the same
    /// transaction as the reload.
    pub replace_delete: Option<String>,
    pub merge: String,
    pub staleness: Option<String>,
}

impl MergePlan {
    pub fn new(model: &dyn TableModel) -> Self {
        let columns = model.sorted_insert_keys();
        let staging = staging_table(model);
        let dest = TableRef::from(&model.table());

        MergePlan {
            create_staging: create_staging_sql(&dest, &staging, &columns),
            copy: copy_sql(&staging, &columns),
            replace_delete: model
                .should_replace()
                .then(|| render_postgres(&DeleteBuilder::new(dest.clone()).build()).0),
            merge: merge_sql(model, &dest, &staging, &columns),
            staleness: staleness_sql(model, &staging),
            columns,
            staging_table: staging,
        }
    }
}

/// Clones the insertable column shape of the destination into a temp
/// table that vanishes when the batch transaction commits or aborts.
fn create_staging_sql(dest: &TableRef, staging: &str, columns: &[String]) -> String {
    let shape = SelectBuilder::new()
        .columns(columns.iter().map(|c| ident(c)).collect())
        .from(dest.clone(), None)
        .build();

    let create = CreateTableAsBuilder::new(TableRef::bare(staging))
        .temp()
        .on_commit_drop()
        .query(shape)
        .with_no_data()
        .build();

    render_postgres(&create).0
}

fn copy_sql(staging: &str, columns: &[String]) -> String {
    let copy = CopyBuilder::new(TableRef::bare(staging))
        .column_names(columns)
        .option("FORMAT", Some("TEXT"))
        .build();
    render_postgres(&copy).0
}

fn merge_sql(model: &dyn TableModel, dest: &TableRef, staging: &str, columns: &[String]) -> String {
    let staged = SelectBuilder::new()
        .columns(columns.iter().map(|c| qual_ident("s", c)).collect())
        .from(TableRef::bare(staging), Some("s"))
        .build();

    let unique_key = model.unique_key();
    let conflict_cols: Vec<&str> = unique_key.iter().map(String::as_str).collect();

    let insert = InsertBuilder::new(dest.clone())
        .column_names(columns)
        .select(staged);

    let insert = if model.is_mutable() {
        let mut assignments: Vec<ConflictAssignment> = columns
            .iter()
            .filter(|c| !unique_key.contains(c))
            .map(|c| ConflictAssignment {
                column: c.clone(),
                value: excluded(c),
            })
            .collect();
        assignments.push(ConflictAssignment {
            column: UPDATED_TS_COL.to_string(),
            value: Expr::Now,
        });
        insert.on_conflict_do_update(&conflict_cols, assignments)
    } else {
        insert.on_conflict_do_nothing(&conflict_cols)
    };

    render_postgres(&insert.build()).0
}

/// Bumps the tracking table for every parent key present in the staged
/// batch. Locks rows via an inner SELECT ordered by key so concurrent
/// loads acquire tracking-row locks in the same order.
fn staleness_sql(model: &dyn TableModel, staging: &str) -> Option<String> {
    let target = model.staleness_target()?;
    let table = TableRef::from(&target.table);

    let staged_keys = SelectBuilder::new()
        .columns(target.key.iter().map(|k| ident(k)).collect())
        .from(TableRef::bare(staging), None)
        .build();

    let mut locked = SelectBuilder::new()
        .columns(target.key.iter().map(|k| qual_ident("t", k)).collect())
        .from(table.clone(), Some("t"))
        .filter(Expr::InSubquery {
            columns: target.key.iter().map(|k| qual_ident("t", k)).collect(),
            query: Box::new(staged_keys),
        });
    for key in &target.key {
        locked = locked.order_by(qual_ident("t", key), None);
    }
    let locked = locked.for_update().build();

    let update = UpdateBuilder::new(table)
        .set(&target.column, Expr::Now)
        .filter(Expr::InSubquery {
            columns: target.key.iter().map(|k| ident(k)).collect(),
            query: Box::new(locked),
        })
        .build();

    Some(render_postgres(&update).0)
}

/// Upserts the starting progress row. On conflict only the run timestamps
/// refresh; `last_ts`/`last_id` keep whatever the previous run committed,
/// which is exactly the resume point.
pub fn progress_init(progress: &LoadProgress) -> (String, Vec<Value>) {
    let insert = InsertBuilder::new(TableRef::from(&progress_table()))
        .columns(&[
            "table_name",
            "batch_partition",
            "last_ts",
            "last_id",
            "job_start_ts",
            "batch_start_ts",
            "batch_complete_ts",
        ])
        .row(vec![
            value(Value::String(progress.table_name.clone())),
            value(Value::String(progress.batch_partition.as_str().to_string())),
            value(Value::Timestamp(progress.last_ts)),
            value(Value::Int(progress.last_id)),
            value(Value::Timestamp(progress.job_start_ts)),
            value(Value::Timestamp(progress.batch_start_ts)),
            value(Value::Timestamp(progress.batch_complete_ts)),
        ])
        .on_conflict_do_update(
            &["table_name", "batch_partition"],
            vec![
                ConflictAssignment {
                    column: "job_start_ts".to_string(),
                    value: excluded("job_start_ts"),
                },
                ConflictAssignment {
                    column: "batch_start_ts".to_string(),
                    value: excluded("batch_start_ts"),
                },
                ConflictAssignment {
                    column: "batch_complete_ts".to_string(),
                    value: excluded("batch_complete_ts"),
                },
            ],
        )
        .build();

    render_postgres(&insert)
}

fn progress_row_filter(table_name: &str, partition: &Partition) -> Expr {
    Expr::and(
        Expr::eq(
            ident("table_name"),
            value(Value::String(table_name.to_string())),
        ),
        Expr::eq(
            ident("batch_partition"),
            value(Value::String(partition.as_str().to_string())),
        ),
    )
}

/// Moves the committed high-water mark. Runs inside the batch
/// transaction so the mark and the data commit or roll back together.
pub fn progress_advance(
    table_name: &str,
    partition: &Partition,
    last_ts: DateTime<Utc>,
    last_id: i64,
) -> (String, Vec<Value>) {
    let update = UpdateBuilder::new(TableRef::from(&progress_table()))
        .set("last_ts", value(Value::Timestamp(last_ts)))
        .set("last_id", value(Value::Int(last_id)))
        .filter(progress_row_filter(table_name, partition))
        .build();
    render_postgres(&update)
}

/// Stamps the batch window complete once the extractor runs dry.
pub fn progress_complete(table_name: &str, partition: &Partition) -> (String, Vec<Value>) {
    let update = UpdateBuilder::new(TableRef::from(&progress_table()))
        .set("batch_complete_ts", Expr::Now)
        .filter(progress_row_filter(table_name, partition))
        .build();
    render_postgres(&update)
}

pub fn progress_fetch(table_name: &str, partition: &Partition) -> (String, Vec<Value>) {
    let select = SelectBuilder::new()
        .columns(vec![
            ident("table_name"),
            ident("batch_partition"),
            ident("last_ts"),
            ident("last_id"),
            ident("job_start_ts"),
            ident("batch_start_ts"),
            ident("batch_complete_ts"),
        ])
        .from(TableRef::from(&progress_table()), None)
        .filter(progress_row_filter(table_name, partition))
        .build();
    render_postgres(&select)
}

/// Expression a batch orders and filters by: the single batch-timestamp
/// column, or `GREATEST` over them when the load kind reads several.
fn batch_ts_expr(model: &dyn TableModel, kind: LoadKind) -> Expr {
    let cols = model.batch_timestamp_cols(kind);
    if cols.len() == 1 {
        ident(&cols[0])
    } else {
        Expr::FuncCall {
            name: "GREATEST".to_string(),
            args: cols.iter().map(|c| ident(c)).collect(),
        }
    }
}

/// Keyset-paginated extraction query for one batch. `inclusive` re-reads
/// rows at the cursor itself, which is required when resuming an
/// interrupted batch window (the cursor row may have committed while its
/// timestamp peers did not). `min_ts` floors the scan for incremental
/// runs so ancient history is never re-walked.
pub fn extraction(
    model: &dyn TableModel,
    kind: LoadKind,
    cursor: (DateTime<Utc>, i64),
    inclusive: bool,
    batch_size: i64,
    min_ts: Option<DateTime<Utc>>,
) -> (String, Vec<Value>) {
    let ts_expr = batch_ts_expr(model, kind);

    let cursor_cmp = match model.cursor_id_col() {
        Some(id_col) => {
            let lhs = Expr::Tuple(vec![ts_expr.clone(), ident(&id_col)]);
            let rhs = Expr::Tuple(vec![
                value(Value::Timestamp(cursor.0)),
                value(Value::Int(cursor.1)),
            ]);
            if inclusive {
                Expr::gt_eq(lhs, rhs)
            } else {
                Expr::gt(lhs, rhs)
            }
        }
        None => {
            let rhs = value(Value::Timestamp(cursor.0));
            if inclusive {
                Expr::gt_eq(ts_expr.clone(), rhs)
            } else {
                Expr::gt(ts_expr.clone(), rhs)
            }
        }
    };

    let filter = match min_ts {
        Some(floor) => Expr::and(
            cursor_cmp,
            Expr::gt_eq(ts_expr.clone(), value(Value::Timestamp(floor))),
        ),
        None => cursor_cmp,
    };

    let mut select = SelectBuilder::new()
        .columns(model.sorted_insert_keys().iter().map(|c| ident(c)).collect())
        .from(TableRef::from(&model.table()), None)
        .filter(filter)
        .order_by(ts_expr, Some(OrderDir::Asc));
    if let Some(id_col) = model.cursor_id_col() {
        select = select.order_by(ident(&id_col), Some(OrderDir::Asc));
    }
    let select = select.limit(value(Value::Int(batch_size))).build();

    render_postgres(&select)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use model::{
        progress::{incomplete_batch_ts, min_load_ts},
        schema::TableId,
        tables::{BeneficiaryTable, ClaimTable, ClaimTypeCodeTable},
    };

    #[test]
    fn beneficiary_plan_stages_copy_and_merges_in_sorted_order() {
        let plan = MergePlan::new(&BeneficiaryTable);

        assert_eq!(plan.staging_table, "idr_beneficiary_stage");
        assert_eq!(
            plan.columns,
            vec![
                "bene_1st_name",
                "bene_brth_dt",
                "bene_last_name",
                "bene_mbi_id",
                "bene_sk",
                "idr_trans_efctv_ts",
                "idr_updt_ts",
            ]
        );
        assert_eq!(
            plan.create_staging,
            concat!(
                "CREATE TEMP TABLE \"idr_beneficiary_stage\" ON COMMIT DROP AS ",
                "SELECT \"bene_1st_name\", \"bene_brth_dt\", \"bene_last_name\", ",
                "\"bene_mbi_id\", \"bene_sk\", \"idr_trans_efctv_ts\", \"idr_updt_ts\" ",
                "FROM \"idr\".\"beneficiary\" WITH NO DATA;"
            )
        );
        assert_eq!(
            plan.copy,
            concat!(
                "COPY \"idr_beneficiary_stage\" (\"bene_1st_name\", \"bene_brth_dt\", ",
                "\"bene_last_name\", \"bene_mbi_id\", \"bene_sk\", \"idr_trans_efctv_ts\", ",
                "\"idr_updt_ts\") FROM STDIN WITH (FORMAT TEXT)"
            )
        );
        assert!(plan.replace_delete.is_none());
        assert!(plan.staleness.is_none());
    }

    #[test]
    fn mutable_merge_updates_everything_but_the_key_and_bumps_audit_ts() {
        let plan = MergePlan::new(&BeneficiaryTable);
        assert_eq!(
            plan.merge,
            concat!(
                "INSERT INTO \"idr\".\"beneficiary\" (\"bene_1st_name\", \"bene_brth_dt\", ",
                "\"bene_last_name\", \"bene_mbi_id\", \"bene_sk\", \"idr_trans_efctv_ts\", ",
                "\"idr_updt_ts\") ",
                "SELECT \"s\".\"bene_1st_name\", \"s\".\"bene_brth_dt\", \"s\".\"bene_last_name\", ",
                "\"s\".\"bene_mbi_id\", \"s\".\"bene_sk\", \"s\".\"idr_trans_efctv_ts\", ",
                "\"s\".\"idr_updt_ts\" FROM \"idr_beneficiary_stage\" AS \"s\" ",
                "ON CONFLICT (\"bene_sk\") DO UPDATE SET ",
                "\"bene_1st_name\" = EXCLUDED.\"bene_1st_name\", ",
                "\"bene_brth_dt\" = EXCLUDED.\"bene_brth_dt\", ",
                "\"bene_last_name\" = EXCLUDED.\"bene_last_name\", ",
                "\"bene_mbi_id\" = EXCLUDED.\"bene_mbi_id\", ",
                "\"idr_trans_efctv_ts\" = EXCLUDED.\"idr_trans_efctv_ts\", ",
                "\"idr_updt_ts\" = EXCLUDED.\"idr_updt_ts\", ",
                "\"bfd_updated_ts\" = NOW();"
            )
        );
    }

    #[test]
    fn immutable_replace_plan_deletes_then_inserts_do_nothing() {
        let plan = MergePlan::new(&ClaimTypeCodeTable);
        assert_eq!(
            plan.replace_delete.as_deref(),
            Some(r#"DELETE FROM "idr"."claim_type_code";"#)
        );
        assert!(plan.merge.ends_with(r#"ON CONFLICT ("clm_type_cd") DO NOTHING;"#));
    }

    #[test]
    fn claim_plan_bumps_beneficiary_staleness_in_key_order() {
        let plan = MergePlan::new(&ClaimTable);
        assert_eq!(
            plan.staleness.as_deref(),
            Some(concat!(
                "UPDATE \"idr\".\"beneficiary_last_updated\" SET \"last_updated\" = NOW() ",
                "WHERE (\"bene_sk\") IN (",
                "SELECT \"t\".\"bene_sk\" FROM \"idr\".\"beneficiary_last_updated\" AS \"t\" ",
                "WHERE (\"t\".\"bene_sk\") IN (SELECT \"bene_sk\" FROM \"idr_claim_stage\") ",
                "ORDER BY \"t\".\"bene_sk\" FOR UPDATE);"
            ))
        );
    }

    #[test]
    fn progress_init_keeps_prior_resume_point_on_conflict() {
        let progress = LoadProgress::starting(
            &TableId::new("idr", "beneficiary"),
            Partition::new("0"),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        );
        let (sql, params) = progress_init(&progress);
        assert_eq!(
            sql,
            concat!(
                "INSERT INTO \"idr\".\"load_progress\" (\"table_name\", \"batch_partition\", ",
                "\"last_ts\", \"last_id\", \"job_start_ts\", \"batch_start_ts\", ",
                "\"batch_complete_ts\") VALUES ($1, $2, $3, $4, $5, $6, $7) ",
                "ON CONFLICT (\"table_name\", \"batch_partition\") DO UPDATE SET ",
                "\"job_start_ts\" = EXCLUDED.\"job_start_ts\", ",
                "\"batch_start_ts\" = EXCLUDED.\"batch_start_ts\", ",
                "\"batch_complete_ts\" = EXCLUDED.\"batch_complete_ts\";"
            )
        );
        assert_eq!(params.len(), 7);
        assert_eq!(params[2], Value::Timestamp(min_load_ts()));
        assert_eq!(params[6], Value::Timestamp(incomplete_batch_ts()));
    }

    #[test]
    fn progress_advance_targets_one_partition_row() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let (sql, params) =
            progress_advance("idr.beneficiary", &Partition::new("0"), ts, 42);
        assert_eq!(
            sql,
            concat!(
                "UPDATE \"idr\".\"load_progress\" SET \"last_ts\" = $1, \"last_id\" = $2 ",
                "WHERE ((\"table_name\" = $3) AND (\"batch_partition\" = $4));"
            )
        );
        assert_eq!(
            params,
            vec![
                Value::Timestamp(ts),
                Value::Int(42),
                Value::String("idr.beneficiary".to_string()),
                Value::String("0".to_string()),
            ]
        );
    }

    #[test]
    fn progress_complete_stamps_now() {
        let (sql, params) = progress_complete("idr.claim", &Partition::new("a"));
        assert_eq!(
            sql,
            concat!(
                "UPDATE \"idr\".\"load_progress\" SET \"batch_complete_ts\" = NOW() ",
                "WHERE ((\"table_name\" = $1) AND (\"batch_partition\" = $2));"
            )
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn initial_extraction_pages_by_timestamp_then_id() {
        let cursor = (min_load_ts(), 0);
        let (sql, params) =
            extraction(&BeneficiaryTable, LoadKind::Initial, cursor, true, 1000, None);
        assert_eq!(
            sql,
            concat!(
                "SELECT \"bene_1st_name\", \"bene_brth_dt\", \"bene_last_name\", ",
                "\"bene_mbi_id\", \"bene_sk\", \"idr_trans_efctv_ts\", \"idr_updt_ts\" ",
                "FROM \"idr\".\"beneficiary\" ",
                "WHERE ((\"idr_trans_efctv_ts\", \"bene_sk\") >= ($1, $2)) ",
                "ORDER BY \"idr_trans_efctv_ts\" ASC, \"bene_sk\" ASC LIMIT $3"
            )
        );
        assert_eq!(
            params,
            vec![
                Value::Timestamp(min_load_ts()),
                Value::Int(0),
                Value::Int(1000),
            ]
        );
    }

    #[test]
    fn incremental_extraction_uses_greatest_and_strict_bound() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let floor = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        let (sql, params) = extraction(
            &ClaimTable,
            LoadKind::Incremental,
            (ts, 9),
            false,
            500,
            Some(floor),
        );
        assert_eq!(
            sql,
            concat!(
                "SELECT \"bene_sk\", \"clm_from_dt\", \"clm_sbmt_chrg_amt\", ",
                "\"clm_thru_dt\", \"clm_type_cd\", \"clm_uniq_id\", \"idr_insrt_ts\", ",
                "\"idr_updt_ts\" FROM \"idr\".\"claim\" ",
                "WHERE (((GREATEST(\"idr_insrt_ts\", \"idr_updt_ts\"), \"clm_uniq_id\") > ($1, $2)) ",
                "AND (GREATEST(\"idr_insrt_ts\", \"idr_updt_ts\") >= $3)) ",
                "ORDER BY GREATEST(\"idr_insrt_ts\", \"idr_updt_ts\") ASC, ",
                "\"clm_uniq_id\" ASC LIMIT $4"
            )
        );
        assert_eq!(
            params,
            vec![
                Value::Timestamp(ts),
                Value::Int(9),
                Value::Timestamp(floor),
                Value::Int(500),
            ]
        );
    }

    #[test]
    fn extraction_falls_back_to_the_unique_key_for_tie_breaks() {
        // Rows sharing a timestamp across a page boundary must still be
        // reachable, so claim_type_code pages on its unique key even
        // though it declares no batch id column.
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let (sql, _) =
            extraction(&ClaimTypeCodeTable, LoadKind::Initial, (ts, 0), true, 100, None);
        assert!(sql.contains(r#"WHERE (("idr_insrt_ts", "clm_type_cd") >= ($1, $2))"#));
        assert!(sql.ends_with(r#"ORDER BY "idr_insrt_ts" ASC, "clm_type_cd" ASC LIMIT $3"#));
    }

    #[test]
    fn extraction_without_any_cursor_id_compares_timestamp_alone() {
        struct CompositeKeyTable;
        impl TableModel for CompositeKeyTable {
            fn table(&self) -> TableId {
                TableId::new("idr", "claim_line")
            }
            fn insert_keys(&self) -> Vec<String> {
                vec!["clm_uniq_id".to_string(), "clm_line_num".to_string(), "idr_insrt_ts".to_string()]
            }
            fn unique_key(&self) -> Vec<String> {
                vec!["clm_uniq_id".to_string(), "clm_line_num".to_string()]
            }
            fn batch_timestamp_cols(&self, _kind: LoadKind) -> Vec<String> {
                vec!["idr_insrt_ts".to_string()]
            }
        }

        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let (sql, _) = extraction(&CompositeKeyTable, LoadKind::Initial, (ts, 0), true, 100, None);
        assert!(sql.contains(r#"WHERE ("idr_insrt_ts" >= $1)"#));
        assert!(sql.ends_with(r#"ORDER BY "idr_insrt_ts" ASC LIMIT $2"#));
    }
}
