/*!
# Datajoin-rs

Asynchronous dataset join coordination for tabular data in Rust.

## Overview

Datajoin-rs merges multiple independently-sourced datasets into one. Given a
list of dataset identifiers it fetches every dataset concurrently, validates
that they share a column-type signature, concatenates their rows into a
single accumulator tagged with per-row provenance, and returns the result
viewed through the caller's lookup (filter, sort, pagination). The first
failure — a missing dataset, a fetch error, or a schema incompatibility —
resolves the whole join; anything completing afterwards is discarded.

## Key Components

* **JoinCoordinator**: the core; fans out one fetch task per identifier and
  merges completions in arrival order
* **DataSet / DataColumn**: a row-oriented table of named, typed columns
* **DataSetLookup**: a query descriptor (filter, sort, pagination) applied
  to a registered dataset
* **DataSetFetcher**: trait for the external collaborator that resolves an
  identifier to a full dataset
* **DataSetStore**: trait for the keyed store used to apply the caller's
  lookup to the joined result; `InMemoryDataSetStore` is provided

## Usage Example

```rust,no_run
use async_trait::async_trait;
use datajoin_rs::{
    DataSet, DataSetFetcher, DataSetLookup, FetchError, InMemoryDataSetStore, JoinCoordinator,
};
use std::sync::Arc;

struct RemoteFetcher;

#[async_trait]
impl DataSetFetcher for RemoteFetcher {
    async fn fetch_and_register(
        &self,
        _uuid: &str,
        _lookup: &DataSetLookup,
    ) -> Result<DataSet, FetchError> {
        // Resolve the identifier against your dataset provider here
        Err(FetchError::NotFound)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = JoinCoordinator::new(
        Arc::new(RemoteFetcher),
        Arc::new(InMemoryDataSetStore::new()),
    );

    let uuids = vec!["sales-eu".to_string(), "sales-us".to_string()];
    let lookup = DataSetLookup::new("sales-joined");

    match coordinator.join_data_sets(&uuids, &lookup).await {
        Ok(joined) => println!("Joined {} rows", joined.row_count()),
        Err(e) => println!("Join failed: {e}"),
    }

    Ok(())
}
```

## Error Handling

Every failure is surfaced as a [`JoinError`] naming the offending dataset.
Only the first error of a join is reported; later completions, successful or
not, are dropped rather than aggregated. There is no retry and no partial
result.
*/

pub mod join;

// Re-export all public APIs for easier access
pub use join::dataset::{ColumnType, DataColumn, DataSet, DATASET_COLUMN};
pub use join::error::{JoinError, Result};
pub use join::fetch::{DataSetFetcher, FetchError};
pub use join::lookup::{ColumnFilter, DataSetLookup, SortOrder, SortSpec};
pub use join::store::{DataSetStore, InMemoryDataSetStore};
pub use join::JoinCoordinator;
