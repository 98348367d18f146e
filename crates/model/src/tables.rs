//! Concrete table models for the IDR destination schema.

use crate::schema::{LoadKind, StalenessTarget, TableId, TableModel};

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// `idr.beneficiary`: mutable parent table keyed by the beneficiary
/// surrogate key.
pub struct BeneficiaryTable;

impl TableModel for BeneficiaryTable {
    fn table(&self) -> TableId {
        TableId::new("idr", "beneficiary")
    }

    fn insert_keys(&self) -> Vec<String> {
        cols(&[
            "bene_sk",
            "bene_mbi_id",
            "bene_1st_name",
            "bene_last_name",
            "bene_brth_dt",
            "idr_trans_efctv_ts",
            "idr_updt_ts",
        ])
    }

    fn computed_keys(&self) -> Vec<String> {
        // Surrogate history key is generated server side.
        cols(&["bene_xref_efctv_sk"])
    }

    fn unique_key(&self) -> Vec<String> {
        cols(&["bene_sk"])
    }

    fn update_timestamp_col(&self) -> Option<String> {
        Some("idr_updt_ts".to_string())
    }

    fn batch_timestamp_cols(&self, kind: LoadKind) -> Vec<String> {
        match kind {
            LoadKind::Initial => cols(&["idr_trans_efctv_ts"]),
            LoadKind::Incremental => cols(&["idr_trans_efctv_ts", "idr_updt_ts"]),
        }
    }

    fn batch_id_col(&self) -> Option<String> {
        Some("bene_sk".to_string())
    }
}

/// `idr.claim`: mutable child table whose batches also bump the
/// beneficiary last-updated tracking table so downstream consumers can
/// tell when a beneficiary's denormalized claim view is stale.
pub struct ClaimTable;

impl TableModel for ClaimTable {
    fn table(&self) -> TableId {
        TableId::new("idr", "claim")
    }

    fn insert_keys(&self) -> Vec<String> {
        cols(&[
            "clm_uniq_id",
            "bene_sk",
            "clm_type_cd",
            "clm_from_dt",
            "clm_thru_dt",
            "clm_sbmt_chrg_amt",
            "idr_insrt_ts",
            "idr_updt_ts",
        ])
    }

    fn unique_key(&self) -> Vec<String> {
        cols(&["clm_uniq_id"])
    }

    fn update_timestamp_col(&self) -> Option<String> {
        Some("idr_updt_ts".to_string())
    }

    fn batch_timestamp_cols(&self, kind: LoadKind) -> Vec<String> {
        match kind {
            LoadKind::Initial => cols(&["idr_insrt_ts"]),
            LoadKind::Incremental => cols(&["idr_insrt_ts", "idr_updt_ts"]),
        }
    }

    fn batch_id_col(&self) -> Option<String> {
        Some("clm_uniq_id".to_string())
    }

    fn staleness_target(&self) -> Option<StalenessTarget> {
        Some(StalenessTarget {
            table: TableId::new("idr", "beneficiary_last_updated"),
            column: "last_updated".to_string(),
            key: cols(&["bene_sk"]),
        })
    }
}

/// `idr.claim_type_code`: immutable reference-code table, reloaded whole
/// on every run.
pub struct ClaimTypeCodeTable;

impl TableModel for ClaimTypeCodeTable {
    fn table(&self) -> TableId {
        TableId::new("idr", "claim_type_code")
    }

    fn insert_keys(&self) -> Vec<String> {
        cols(&["clm_type_cd", "clm_type_desc", "idr_insrt_ts"])
    }

    fn unique_key(&self) -> Vec<String> {
        cols(&["clm_type_cd"])
    }

    fn batch_timestamp_cols(&self, _kind: LoadKind) -> Vec<String> {
        cols(&["idr_insrt_ts"])
    }

    fn should_replace(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beneficiary_is_mutable_with_sorted_keys() {
        let model = BeneficiaryTable;
        assert!(model.is_mutable());
        let sorted = model.sorted_insert_keys();
        let mut expected = model.insert_keys();
        expected.sort();
        assert_eq!(sorted, expected);
        assert_eq!(sorted.first().map(String::as_str), Some("bene_1st_name"));
    }

    #[test]
    fn claim_type_code_is_immutable_replace() {
        let model = ClaimTypeCodeTable;
        assert!(!model.is_mutable());
        assert!(model.should_replace());
        assert!(model.staleness_target().is_none());
    }

    #[test]
    fn claim_type_code_pages_on_its_unique_key() {
        let model = ClaimTypeCodeTable;
        assert!(model.batch_id_col().is_none());
        assert_eq!(model.cursor_id_col(), Some("clm_type_cd".to_string()));
    }

    #[test]
    fn declared_batch_id_wins_over_the_unique_key() {
        assert_eq!(
            BeneficiaryTable.cursor_id_col(),
            Some("bene_sk".to_string())
        );
    }

    #[test]
    fn incremental_kind_adds_update_timestamp() {
        let model = ClaimTable;
        assert_eq!(
            model.batch_timestamp_cols(LoadKind::Initial),
            vec!["idr_insrt_ts".to_string()]
        );
        assert_eq!(
            model.batch_timestamp_cols(LoadKind::Incremental),
            vec!["idr_insrt_ts".to_string(), "idr_updt_ts".to_string()]
        );
    }
}
