//! # Dataset Join Example
//!
//! This example demonstrates joining independently-sourced datasets with
//! datajoin-rs.
//!
//! It shows three scenarios:
//! 1. A successful join of two regional sales datasets, sorted post-join
//! 2. A failing join where one source is missing (first error wins)
//! 3. A batch of joins running concurrently
//!
//! Run with: `cargo run --example join_datasets`
//! (set `RUST_LOG=debug` to see the coordinator's progress lines)

use async_trait::async_trait;
use datajoin_rs::{
    ColumnType, DataColumn, DataSet, DataSetFetcher, DataSetLookup, FetchError,
    InMemoryDataSetStore, JoinCoordinator, SortSpec, DATASET_COLUMN,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Fetcher simulating remote dataset providers with per-source latency.
struct CatalogFetcher {
    catalog: HashMap<String, DataSet>,
}

#[async_trait]
impl DataSetFetcher for CatalogFetcher {
    async fn fetch_and_register(
        &self,
        uuid: &str,
        _lookup: &DataSetLookup,
    ) -> Result<DataSet, FetchError> {
        // stagger completions so arrival order differs from request order
        sleep(Duration::from_millis(5 + (uuid.len() as u64 % 4) * 10)).await;
        self.catalog.get(uuid).cloned().ok_or(FetchError::NotFound)
    }
}

fn regional_sales(uuid: &str, rows: &[(&str, f64)]) -> DataSet {
    let mut ds = DataSet::new(uuid);
    ds.columns.push(DataColumn::with_values(
        "region",
        ColumnType::Label,
        rows.iter().map(|(r, _)| json!(r)).collect(),
    ));
    ds.columns.push(DataColumn::with_values(
        "amount",
        ColumnType::Number,
        rows.iter().map(|(_, a)| json!(a)).collect(),
    ));
    ds
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Dataset Join Example");
    println!("====================\n");

    let mut catalog = HashMap::new();
    for ds in [
        regional_sales("sales-eu", &[("DE", 1200.0), ("FR", 800.0), ("IT", 650.0)]),
        regional_sales("sales-us", &[("CA", 2100.0), ("NY", 1700.0)]),
        regional_sales("sales-apac", &[("JP", 900.0), ("AU", 400.0)]),
    ] {
        catalog.insert(ds.uuid.clone(), ds);
    }

    let coordinator = JoinCoordinator::new(
        Arc::new(CatalogFetcher { catalog }),
        Arc::new(InMemoryDataSetStore::new()),
    );

    // 1. Join two regions and sort the combined rows by amount
    println!("1. Joining sales-eu + sales-us, sorted by amount descending:");
    let lookup = DataSetLookup::new("sales-joined").with_sort(SortSpec::descending("amount"));
    let uuids = vec!["sales-eu".to_string(), "sales-us".to_string()];
    let joined = coordinator.join_data_sets(&uuids, &lookup).await?;

    let regions = &joined.column_by_id("region").unwrap().values;
    let amounts = &joined.column_by_id("amount").unwrap().values;
    let sources = &joined.column_by_id(DATASET_COLUMN).unwrap().values;
    for i in 0..joined.row_count() {
        println!(
            "   {} {:>8} (from {})",
            regions[i], amounts[i], sources[i]
        );
    }

    // 2. One missing source fails the whole join with the first error
    println!("\n2. Joining with a missing source:");
    let uuids = vec!["sales-eu".to_string(), "sales-emea".to_string()];
    match coordinator
        .join_data_sets(&uuids, &DataSetLookup::new("sales-joined"))
        .await
    {
        Ok(_) => println!("   unexpected success"),
        Err(e) if e.is_fetch_side() => println!("   fetch failed: {e}"),
        Err(e) => println!("   datasets incompatible: {e}"),
    }

    // 3. Several joins running concurrently against the same coordinator
    println!("\n3. Running a batch of joins concurrently:");
    let batches = vec![
        ("atlantic", vec!["sales-eu".to_string(), "sales-us".to_string()]),
        ("pacific", vec!["sales-us".to_string(), "sales-apac".to_string()]),
        ("global", vec![
            "sales-eu".to_string(),
            "sales-us".to_string(),
            "sales-apac".to_string(),
        ]),
    ];
    let joins = batches.iter().map(|(target, uuids)| {
        let coordinator = &coordinator;
        async move {
            let lookup = DataSetLookup::new(*target);
            (*target, coordinator.join_data_sets(uuids, &lookup).await)
        }
    });
    for (target, result) in futures::future::join_all(joins).await {
        match result {
            Ok(joined) => println!("   {target}: {} rows", joined.row_count()),
            Err(e) => println!("   {target}: failed ({e})"),
        }
    }

    Ok(())
}
