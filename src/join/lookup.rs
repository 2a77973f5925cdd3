use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keeps rows whose value in `column_id` is a member of `allowed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column_id: String,
    pub allowed: Vec<Value>,
}

impl ColumnFilter {
    pub fn equals_to(column_id: impl Into<String>, value: Value) -> Self {
        Self {
            column_id: column_id.into(),
            allowed: vec![value],
        }
    }

    pub fn any_of(column_id: impl Into<String>, allowed: Vec<Value>) -> Self {
        Self {
            column_id: column_id.into(),
            allowed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One sort key; keys are applied left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column_id: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn ascending(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            order: SortOrder::Descending,
        }
    }
}

/// A query descriptor applied against a registered dataset: which dataset
/// to read, which rows to keep, how to order them, and which window of the
/// result to return.
///
/// For a join request `data_set_uuid` names the identifier the joined
/// result is registered under before the lookup is applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSetLookup {
    pub data_set_uuid: String,
    #[serde(default)]
    pub filters: Vec<ColumnFilter>,
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    #[serde(default)]
    pub row_offset: usize,
    /// `None` returns all rows from `row_offset` on
    #[serde(default)]
    pub number_of_rows: Option<usize>,
}

impl DataSetLookup {
    pub fn new(data_set_uuid: impl Into<String>) -> Self {
        Self {
            data_set_uuid: data_set_uuid.into(),
            filters: Vec::new(),
            sort: Vec::new(),
            row_offset: 0,
            number_of_rows: None,
        }
    }

    pub fn with_filter(mut self, filter: ColumnFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn with_rows(mut self, row_offset: usize, number_of_rows: usize) -> Self {
        self.row_offset = row_offset;
        self.number_of_rows = Some(number_of_rows);
        self
    }

    /// Per-fetch lookup for a single source dataset: the caller's filters
    /// carry over, sorting and pagination do not — ordering and windowing
    /// are applied once, after the join.
    pub fn narrow(&self, uuid: &str) -> Self {
        Self {
            data_set_uuid: uuid.to_string(),
            filters: self.filters.clone(),
            sort: Vec::new(),
            row_offset: 0,
            number_of_rows: None,
        }
    }
}
