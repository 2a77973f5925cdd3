use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Identifier of the synthetic provenance column appended to a joined
/// dataset: one Label value per row naming the source dataset that
/// contributed the row.
pub const DATASET_COLUMN: &str = "dataset";

/// Scalar type of a dataset column.
///
/// Serialized in the uppercase wire form (`"LABEL"`, `"NUMBER"`, ...) used
/// by external dataset definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Label,
    Number,
    Date,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Label => "LABEL",
            ColumnType::Number => "NUMBER",
            ColumnType::Date => "DATE",
            ColumnType::Text => "TEXT",
        };
        f.write_str(name)
    }
}

/// A named, typed column holding one value per row.
///
/// Cell values are JSON scalars: Number columns hold JSON numbers, Date
/// columns hold RFC 3339 strings, Label/Text columns hold strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataColumn {
    pub id: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl DataColumn {
    pub fn new(id: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            column_type,
            values: Vec::new(),
        }
    }

    /// Column with its row values already populated
    pub fn with_values(
        id: impl Into<String>,
        column_type: ColumnType,
        values: Vec<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            column_type,
            values,
        }
    }
}

/// A row-oriented table with a unique identifier and an ordered set of
/// equally-sized columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    pub uuid: String,
    #[serde(default)]
    pub columns: Vec<DataColumn>,
}

impl DataSet {
    /// Empty dataset registered under the given identifier
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            columns: Vec::new(),
        }
    }

    /// Empty dataset with a freshly minted identifier
    pub fn empty() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Append an empty column of the given type
    pub fn add_column(&mut self, id: impl Into<String>, column_type: ColumnType) {
        self.columns.push(DataColumn::new(id, column_type));
    }

    pub fn column_by_id(&self, id: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_by_id_mut(&mut self, id: &str) -> Option<&mut DataColumn> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    /// Number of rows, taken from the first column. All columns are kept
    /// at equal length by the operations in this crate.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }
}
