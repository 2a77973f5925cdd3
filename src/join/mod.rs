pub mod dataset;
pub mod error;
pub mod fetch;
pub mod lookup;
pub mod store;

// Re-export key types for easier access
pub use dataset::{ColumnType, DataColumn, DataSet, DATASET_COLUMN};
pub use error::{JoinError, Result};
pub use fetch::{DataSetFetcher, FetchError};
pub use lookup::{ColumnFilter, DataSetLookup, SortOrder, SortSpec};
pub use store::{DataSetStore, InMemoryDataSetStore};

use log::debug;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Orchestrates concurrent fetches for a set of dataset identifiers and
/// merges the results into one provenance-tagged dataset.
///
/// One fetch task is spawned per identifier; completions flow back over a
/// channel and are merged in arrival order by this single consuming future,
/// which is the only owner of the accumulator. The first failure — fetch
/// error, missing dataset, or schema incompatibility — resolves the join
/// immediately; results arriving after that are discarded unobserved. Both
/// the success and error outcome are therefore delivered exactly once.
pub struct JoinCoordinator {
    fetcher: Arc<dyn DataSetFetcher>,
    store: Arc<dyn DataSetStore>,
}

impl JoinCoordinator {
    pub fn new(fetcher: Arc<dyn DataSetFetcher>, store: Arc<dyn DataSetStore>) -> Self {
        Self { fetcher, store }
    }

    /// Fetch every dataset in `uuids` concurrently, merge them, and return
    /// the joined dataset viewed through the caller's `lookup`.
    ///
    /// Each identifier is fetched with a narrow, filter-only lookup; the
    /// full lookup (sort and pagination included) is applied once, to the
    /// joined result, via the registration store. Duplicate identifiers
    /// are fetched and merged once per occurrence. An empty `uuids` list
    /// yields an empty dataset with no columns.
    pub async fn join_data_sets(
        &self,
        uuids: &[String],
        lookup: &DataSetLookup,
    ) -> Result<DataSet> {
        debug!(
            "Joining {} data sets into {}",
            uuids.len(),
            lookup.data_set_uuid
        );

        let mut joined = DataSet::empty();
        joined.uuid = lookup.data_set_uuid.clone();
        let mut missing: Vec<String> = uuids.to_vec();

        let (tx, mut rx) = mpsc::channel(uuids.len().max(1));
        for uuid in uuids {
            let fetcher = Arc::clone(&self.fetcher);
            let narrow = lookup.narrow(uuid);
            let uuid = uuid.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = fetcher.fetch_and_register(&uuid, &narrow).await;
                // the receiver is gone once the join has failed; a send
                // error just means the result is no longer wanted
                let _ = tx.send((uuid, outcome)).await;
            });
        }
        drop(tx);

        while !missing.is_empty() {
            let Some((uuid, outcome)) = rx.recv().await else {
                // all senders gone with work outstanding: a fetch task
                // ended without reporting (panicked or was aborted)
                return Err(JoinError::fetch(
                    missing.remove(0),
                    "fetch ended without a result",
                ));
            };
            let data_set = match outcome {
                Ok(data_set) => data_set,
                Err(FetchError::NotFound) => return Err(JoinError::NotFound(uuid)),
                Err(FetchError::Failed(message)) => {
                    return Err(JoinError::Fetch { uuid, message });
                }
            };
            if let Some(pos) = missing.iter().position(|m| m == &uuid) {
                missing.remove(pos);
            }
            merge(&mut joined, &data_set)?;
            debug!(
                "Merged data set {uuid}: {} rows joined, {} fetches pending",
                joined.row_count(),
                missing.len()
            );
        }

        // Apply the caller's filter/sort/pagination to the joined result
        // through the store, then drop the scratch registration.
        self.store.register(joined);
        let result = self.store.lookup(lookup);
        self.store.remove(&lookup.data_set_uuid);
        result
    }
}

/// Merge `incoming` into the accumulator.
///
/// The first dataset to arrive establishes the schema: its (id, type)
/// pairs plus the synthetic provenance column. Later arrivals must match
/// that schema positionally by type; their rows are appended as one
/// contiguous block, and the provenance column records their uuid once
/// per row.
fn merge(joined: &mut DataSet, incoming: &DataSet) -> Result<()> {
    if joined.columns.is_empty() {
        for column in &incoming.columns {
            joined.add_column(column.id.clone(), column.column_type);
        }
        joined.add_column(DATASET_COLUMN, ColumnType::Label);
    }

    verify_compatibility(joined, incoming)?;

    for column in &incoming.columns {
        let target = joined.column_by_id_mut(&column.id).ok_or_else(|| {
            JoinError::Lookup(format!(
                "Data set {} column {} is not part of the joined schema",
                incoming.uuid, column.id
            ))
        })?;
        target.values.extend(column.values.iter().cloned());
    }

    let row_count = incoming.row_count();
    if let Some(provenance) = joined.column_by_id_mut(DATASET_COLUMN) {
        provenance
            .values
            .extend((0..row_count).map(|_| Value::String(incoming.uuid.clone())));
    }

    Ok(())
}

/// Positional type check of `incoming` against the accumulator's real
/// columns (all but the provenance column).
fn verify_compatibility(joined: &DataSet, incoming: &DataSet) -> Result<()> {
    let initial_columns: Vec<&DataColumn> = joined
        .columns
        .iter()
        .filter(|c| c.id != DATASET_COLUMN)
        .collect();

    if incoming.columns.len() != initial_columns.len() {
        return Err(JoinError::ColumnCountMismatch {
            uuid: incoming.uuid.clone(),
            expected: initial_columns.len(),
            found: incoming.columns.len(),
        });
    }

    for (i, (column, initial)) in incoming.columns.iter().zip(initial_columns).enumerate() {
        if column.column_type != initial.column_type {
            return Err(JoinError::ColumnTypeMismatch {
                uuid: incoming.uuid.clone(),
                column: i,
                expected: initial.column_type,
                found: column.column_type,
            });
        }
    }

    Ok(())
}
