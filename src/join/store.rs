use chrono::DateTime;
use log::debug;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::join::dataset::{ColumnType, DataColumn, DataSet};
use crate::join::error::{JoinError, Result};
use crate::join::lookup::{DataSetLookup, SortOrder};

/// Keyed store for registered datasets.
///
/// The coordinator uses it to apply the caller's full lookup (filter, sort,
/// pagination) to a freshly joined dataset: register, look up, remove. It
/// is injected rather than global so tests can observe and replace it.
pub trait DataSetStore: Send + Sync {
    /// Register a dataset under its own uuid, replacing any previous
    /// registration for that uuid
    fn register(&self, data_set: DataSet);

    /// Resolve a lookup to a filtered/sorted/paginated view of the
    /// registered dataset it targets
    fn lookup(&self, lookup: &DataSetLookup) -> Result<DataSet>;

    /// Drop the registration for the given uuid, if any
    fn remove(&self, uuid: &str);
}

/// In-memory `DataSetStore` backed by a mutex-guarded map.
#[derive(Default)]
pub struct InMemoryDataSetStore {
    data_sets: Mutex<HashMap<String, DataSet>>,
}

impl InMemoryDataSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered datasets
    pub fn len(&self) -> usize {
        self.data_sets.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DataSetStore for InMemoryDataSetStore {
    fn register(&self, data_set: DataSet) {
        debug!(
            "Registering data set {} ({} rows)",
            data_set.uuid,
            data_set.row_count()
        );
        self.data_sets
            .lock()
            .unwrap()
            .insert(data_set.uuid.clone(), data_set);
    }

    fn lookup(&self, lookup: &DataSetLookup) -> Result<DataSet> {
        let data_sets = self.data_sets.lock().unwrap();
        let data_set = data_sets
            .get(&lookup.data_set_uuid)
            .ok_or_else(|| JoinError::NotFound(lookup.data_set_uuid.clone()))?;
        apply_lookup(data_set, lookup)
    }

    fn remove(&self, uuid: &str) {
        debug!("Removing data set {uuid}");
        self.data_sets.lock().unwrap().remove(uuid);
    }
}

/// Materialize the view a lookup describes: filters first, then sort keys
/// left to right, then the pagination window. Works over an index vector so
/// the column-oriented values are only copied once, at projection time.
/// Row indices run to the first column's length; cells missing from a
/// shorter column read as nulls.
fn apply_lookup(data_set: &DataSet, lookup: &DataSetLookup) -> Result<DataSet> {
    let mut rows: Vec<usize> = (0..data_set.row_count()).collect();

    for filter in &lookup.filters {
        let column = data_set.column_by_id(&filter.column_id).ok_or_else(|| {
            JoinError::Lookup(format!(
                "Data set {} has no column {} to filter on",
                data_set.uuid, filter.column_id
            ))
        })?;
        rows.retain(|&i| {
            column
                .values
                .get(i)
                .is_some_and(|v| filter.allowed.contains(v))
        });
    }

    if !lookup.sort.is_empty() {
        let mut keys = Vec::with_capacity(lookup.sort.len());
        for sort in &lookup.sort {
            let column = data_set.column_by_id(&sort.column_id).ok_or_else(|| {
                JoinError::Lookup(format!(
                    "Data set {} has no column {} to sort on",
                    data_set.uuid, sort.column_id
                ))
            })?;
            keys.push((column, sort.order));
        }
        rows.sort_by(|&a, &b| {
            for (column, order) in &keys {
                let ordering = compare_values(
                    column.values.get(a).unwrap_or(&Value::Null),
                    column.values.get(b).unwrap_or(&Value::Null),
                    column.column_type,
                );
                let ordering = match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    let window: Vec<usize> = rows
        .into_iter()
        .skip(lookup.row_offset)
        .take(lookup.number_of_rows.unwrap_or(usize::MAX))
        .collect();

    let columns = data_set
        .columns
        .iter()
        .map(|column| {
            DataColumn::with_values(
                column.id.clone(),
                column.column_type,
                window
                    .iter()
                    .map(|&i| column.values.get(i).cloned().unwrap_or(Value::Null))
                    .collect(),
            )
        })
        .collect();

    Ok(DataSet {
        uuid: data_set.uuid.clone(),
        columns,
    })
}

/// Type-aware cell comparison. Number columns compare numerically, Date
/// columns as RFC 3339 timestamps, everything else as strings. Cells that
/// do not parse for their declared type fall back to string comparison.
fn compare_values(a: &Value, b: &Value, column_type: ColumnType) -> Ordering {
    match column_type {
        ColumnType::Number => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        ColumnType::Date => {
            let parse = |v: &Value| {
                v.as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            };
            match (parse(a), parse(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => as_text(a).cmp(&as_text(b)),
            }
        }
        ColumnType::Label | ColumnType::Text => as_text(a).cmp(&as_text(b)),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::lookup::{ColumnFilter, SortSpec};
    use serde_json::json;

    fn sales() -> DataSet {
        let mut ds = DataSet::new("sales");
        ds.columns.push(DataColumn::with_values(
            "region",
            ColumnType::Label,
            vec![json!("EU"), json!("US"), json!("EU"), json!("APAC")],
        ));
        ds.columns.push(DataColumn::with_values(
            "amount",
            ColumnType::Number,
            vec![json!(30.0), json!(10.0), json!(20.0), json!(40.0)],
        ));
        ds.columns.push(DataColumn::with_values(
            "closed",
            ColumnType::Date,
            vec![
                json!("2024-03-01T00:00:00Z"),
                json!("2024-01-15T00:00:00Z"),
                json!("2024-02-01T00:00:00Z"),
                json!("2023-12-31T00:00:00Z"),
            ],
        ));
        ds
    }

    #[test]
    fn test_register_lookup_remove_cycle() {
        let store = InMemoryDataSetStore::new();
        store.register(sales());
        assert_eq!(store.len(), 1);

        let result = store.lookup(&DataSetLookup::new("sales")).unwrap();
        assert_eq!(result.row_count(), 4);

        store.remove("sales");
        assert!(store.is_empty());
        let err = store.lookup(&DataSetLookup::new("sales")).unwrap_err();
        assert_eq!(err, JoinError::NotFound("sales".to_string()));
    }

    #[test]
    fn test_filter_keeps_matching_rows() {
        let store = InMemoryDataSetStore::new();
        store.register(sales());

        let lookup = DataSetLookup::new("sales")
            .with_filter(ColumnFilter::equals_to("region", json!("EU")));
        let result = store.lookup(&lookup).unwrap();

        assert_eq!(result.row_count(), 2);
        assert_eq!(
            result.column_by_id("amount").unwrap().values,
            vec![json!(30.0), json!(20.0)]
        );
    }

    #[test]
    fn test_numeric_sort_descending() {
        let store = InMemoryDataSetStore::new();
        store.register(sales());

        let lookup = DataSetLookup::new("sales").with_sort(SortSpec::descending("amount"));
        let result = store.lookup(&lookup).unwrap();

        assert_eq!(
            result.column_by_id("amount").unwrap().values,
            vec![json!(40.0), json!(30.0), json!(20.0), json!(10.0)]
        );
    }

    #[test]
    fn test_date_sort_uses_timestamps_not_strings() {
        let store = InMemoryDataSetStore::new();
        store.register(sales());

        let lookup = DataSetLookup::new("sales").with_sort(SortSpec::ascending("closed"));
        let result = store.lookup(&lookup).unwrap();

        assert_eq!(
            result.column_by_id("region").unwrap().values,
            vec![json!("APAC"), json!("US"), json!("EU"), json!("EU")]
        );
    }

    #[test]
    fn test_multi_key_sort() {
        let store = InMemoryDataSetStore::new();
        store.register(sales());

        let lookup = DataSetLookup::new("sales")
            .with_sort(SortSpec::ascending("region"))
            .with_sort(SortSpec::descending("amount"));
        let result = store.lookup(&lookup).unwrap();

        assert_eq!(
            result.column_by_id("region").unwrap().values,
            vec![json!("APAC"), json!("EU"), json!("EU"), json!("US")]
        );
        assert_eq!(
            result.column_by_id("amount").unwrap().values,
            vec![json!(40.0), json!(30.0), json!(20.0), json!(10.0)]
        );
    }

    #[test]
    fn test_pagination_window() {
        let store = InMemoryDataSetStore::new();
        store.register(sales());

        let lookup = DataSetLookup::new("sales")
            .with_sort(SortSpec::ascending("amount"))
            .with_rows(1, 2);
        let result = store.lookup(&lookup).unwrap();

        assert_eq!(
            result.column_by_id("amount").unwrap().values,
            vec![json!(20.0), json!(30.0)]
        );
    }

    #[test]
    fn test_lookup_tolerates_uneven_column_lengths() {
        // a caller can register a malformed dataset; lookups against it
        // read the missing cells as nulls instead of panicking
        let mut ragged = DataSet::new("ragged");
        ragged.columns.push(DataColumn::with_values(
            "region",
            ColumnType::Label,
            vec![json!("EU"), json!("US"), json!("APAC")],
        ));
        ragged.columns.push(DataColumn::with_values(
            "amount",
            ColumnType::Number,
            vec![json!(10.0), json!(20.0)],
        ));

        let store = InMemoryDataSetStore::new();
        store.register(ragged);

        let lookup = DataSetLookup::new("ragged").with_sort(SortSpec::ascending("amount"));
        let result = store.lookup(&lookup).unwrap();

        assert_eq!(result.row_count(), 3);
        // the short column's missing cell sorts after the numbers and
        // projects as null
        assert_eq!(
            result.column_by_id("amount").unwrap().values,
            vec![json!(10.0), json!(20.0), Value::Null]
        );

        let filtered = store
            .lookup(
                &DataSetLookup::new("ragged")
                    .with_filter(ColumnFilter::equals_to("amount", json!(10.0))),
            )
            .unwrap();
        assert_eq!(filtered.row_count(), 1);
    }

    #[test]
    fn test_unknown_column_in_filter_or_sort_is_a_lookup_error() {
        let store = InMemoryDataSetStore::new();
        store.register(sales());

        let lookup = DataSetLookup::new("sales")
            .with_filter(ColumnFilter::equals_to("nope", json!("x")));
        assert!(matches!(
            store.lookup(&lookup),
            Err(JoinError::Lookup(msg)) if msg.contains("nope")
        ));

        let lookup = DataSetLookup::new("sales").with_sort(SortSpec::ascending("nope"));
        assert!(matches!(store.lookup(&lookup), Err(JoinError::Lookup(_))));
    }
}
