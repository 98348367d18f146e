use model::{
    schema::TableModel,
    tables::{BeneficiaryTable, ClaimTable, ClaimTypeCodeTable},
};

static BENEFICIARY: BeneficiaryTable = BeneficiaryTable;
static CLAIM_TYPE_CODE: ClaimTypeCodeTable = ClaimTypeCodeTable;
static CLAIM: ClaimTable = ClaimTable;

/// Every known destination table, in load order: parents and reference
/// codes before the claims that refer to them.
pub fn all_tables() -> Vec<&'static dyn TableModel> {
    vec![&BENEFICIARY, &CLAIM_TYPE_CODE, &CLAIM]
}

pub fn find(name: &str) -> Option<&'static dyn TableModel> {
    all_tables()
        .into_iter()
        .find(|model| model.table().to_string() == name || model.table().name == name)
}
