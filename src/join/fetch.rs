use async_trait::async_trait;
use thiserror::Error;

use crate::join::dataset::DataSet;
use crate::join::lookup::DataSetLookup;

/// Outcome of a single dataset fetch, before the coordinator ties it to
/// the identifier it was issued for.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// The identifier does not resolve to any dataset
    #[error("not found")]
    NotFound,

    /// Transport or processing failure while resolving the dataset
    #[error("{0}")]
    Failed(String),
}

/// External collaborator that resolves a dataset identifier to a full
/// dataset.
///
/// Implementations typically download the dataset from its external source
/// and register it in a client-side store as a side effect; the coordinator
/// only consumes the returned payload. The `lookup` it passes is the
/// narrow, filter-only form of the caller's request (see
/// [`DataSetLookup::narrow`]).
#[async_trait]
pub trait DataSetFetcher: Send + Sync {
    async fn fetch_and_register(
        &self,
        uuid: &str,
        lookup: &DataSetLookup,
    ) -> std::result::Result<DataSet, FetchError>;
}
