use chrono::SecondsFormat;
use model::core::{
    utils::{escape_copy_text, strip_null_bytes},
    value::Value,
};

/// Encodes one value into its COPY wire representation.
pub trait CopyValueEncoder {
    fn encode_value(&self, value: &Value) -> String;
    fn encode_null(&self) -> String;
}

/// TEXT-format COPY encoder. Strings are NUL-stripped before escaping:
/// `\0` is valid UTF-8 but Postgres text columns reject it.
pub struct PgCopyTextEncoder;

impl PgCopyTextEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PgCopyTextEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyValueEncoder for PgCopyTextEncoder {
    fn encode_value(&self, value: &Value) -> String {
        match value {
            Value::Null => self.encode_null(),
            Value::String(s) => escape_copy_text(&strip_null_bytes(s)),
            Value::Boolean(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => ryu::Buffer::new().format(*v).to_string(),
            Value::Date(d) => d.to_string(),
            Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    fn encode_null(&self) -> String {
        "\\N".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn strips_nul_and_escapes_controls() {
        let encoder = PgCopyTextEncoder::new();
        let value = Value::String("na\0me\twith\nbreaks".to_string());
        assert_eq!(encoder.encode_value(&value), r"name\twith\nbreaks");
    }

    #[test]
    fn null_encodes_as_backslash_n() {
        let encoder = PgCopyTextEncoder::new();
        assert_eq!(encoder.encode_value(&Value::Null), r"\N");
    }

    #[test]
    fn timestamp_uses_micros_utc() {
        let encoder = PgCopyTextEncoder::new();
        let ts = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(
            encoder.encode_value(&Value::Timestamp(ts)),
            "2024-03-01T12:30:45.000000Z"
        );
    }

    #[test]
    fn scalars_encode_plainly() {
        let encoder = PgCopyTextEncoder::new();
        assert_eq!(encoder.encode_value(&Value::Int(-3)), "-3");
        assert_eq!(encoder.encode_value(&Value::Boolean(true)), "true");
        assert_eq!(encoder.encode_value(&Value::Float(1.5)), "1.5");
    }
}
