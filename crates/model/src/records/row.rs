use crate::core::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnValue {
    pub name: String,
    pub value: Value,
}

/// One extracted record: the originating table plus an ordered list of
/// column/value pairs. The explicit pair list (rather than a reflective
/// mapping over object attributes) is what the loader iterates when it
/// builds COPY lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub table: String,
    pub columns: Vec<ColumnValue>,
}

impl Row {
    pub fn new(table: &str, columns: Vec<ColumnValue>) -> Self {
        Row {
            table: table.to_string(),
            columns,
        }
    }

    pub fn from_pairs(table: &str, pairs: Vec<(&str, Value)>) -> Self {
        let columns = pairs
            .into_iter()
            .map(|(name, value)| ColumnValue {
                name: name.to_string(),
                value,
            })
            .collect();
        Self::new(table, columns)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(column))
            .map(|c| &c.value)
    }

    /// Missing columns read as SQL NULL.
    pub fn value(&self, column: &str) -> Value {
        self.get(column).cloned().unwrap_or(Value::Null)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// The insertable view of this row: values projected onto `keys`, in
    /// the order given. The loader passes its sorted insert-key list here
    /// so COPY column order is stable across batches.
    pub fn insertable_values(&self, keys: &[String]) -> Vec<(String, Value)> {
        keys.iter()
            .map(|key| (key.clone(), self.value(key)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let row = Row::from_pairs("idr.beneficiary", vec![("BENE_SK", Value::Int(7))]);
        assert_eq!(row.value("bene_sk"), Value::Int(7));
    }

    #[test]
    fn missing_column_reads_as_null() {
        let row = Row::from_pairs("idr.beneficiary", vec![("bene_sk", Value::Int(7))]);
        assert_eq!(row.value("bene_mbi_id"), Value::Null);
    }

    #[test]
    fn insertable_view_follows_key_order() {
        let row = Row::from_pairs(
            "idr.beneficiary",
            vec![
                ("b", Value::Int(2)),
                ("a", Value::Int(1)),
                ("c", Value::Int(3)),
            ],
        );
        let keys = vec!["a".to_string(), "b".to_string(), "missing".to_string()];
        let view = row.insertable_values(&keys);
        assert_eq!(
            view,
            vec![
                ("a".to_string(), Value::Int(1)),
                ("b".to_string(), Value::Int(2)),
                ("missing".to_string(), Value::Null),
            ]
        );
    }
}
