use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Opaque shard key under which load progress is tracked independently.
/// The loader never interprets it beyond using it as a string key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition(Arc<str>);

impl Partition {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Partition {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Partition {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
