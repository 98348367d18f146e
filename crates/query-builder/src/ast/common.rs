use model::schema::TableId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn bare(name: &str) -> Self {
        TableRef {
            schema: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(schema: &str, name: &str) -> Self {
        TableRef {
            schema: Some(schema.to_string()),
            name: name.to_string(),
        }
    }
}

impl From<&TableId> for TableRef {
    fn from(id: &TableId) -> Self {
        TableRef::qualified(&id.schema, &id.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}
