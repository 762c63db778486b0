mod common;

use anyhow::Result;
use common::{args, test_store};
use poynts::application::{BalanceService, Chaincode};
use poynts::io::{Exporter, ImportOptions, Importer, StateSnapshot};
use poynts::storage::{MemoryStore, StateStore};

#[tokio::test]
async fn test_export_csv() -> Result<()> {
    let (store, _temp) = test_store().await?;
    store.put("bob", b"-5".to_vec()).await?;
    store.put("alice", b"110".to_vec()).await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&store).export_csv(&mut buffer).await?;

    assert_eq!(count, 2);
    assert_eq!(String::from_utf8(buffer)?, "key,value\nalice,110\nbob,-5\n");

    Ok(())
}

#[tokio::test]
async fn test_export_json() -> Result<()> {
    let (store, _temp) = test_store().await?;
    store.put("alice", b"7".to_vec()).await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&store).export_json(&mut buffer).await?;
    assert_eq!(snapshot.entries.len(), 1);

    let parsed: StateSnapshot = serde_json::from_slice(&buffer)?;
    assert_eq!(parsed.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(parsed.entries[0].key, "alice");
    assert_eq!(parsed.entries[0].value, "7");

    Ok(())
}

#[tokio::test]
async fn test_import_csv_seeds_buckets() -> Result<()> {
    let store = MemoryStore::new();
    let csv = "key,value\nalice,100\nbob,-20\n";

    let result = Importer::new(&store)
        .import_csv(csv.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    assert!(result.errors.is_empty());

    // Seeded buckets are usable by add/deduct right away
    let service = BalanceService::new(store.clone());
    assert_eq!(service.invoke("add", &args(&["alice", "10"])).await?, b"110");
    assert_eq!(service.invoke("deduct", &args(&["bob", "5"])).await?, b"-25");

    Ok(())
}

#[tokio::test]
async fn test_import_rejects_non_numeric_values() -> Result<()> {
    let store = MemoryStore::new();
    let csv = "key,value\nalice,100\nbob,lots\n,5\ncarol,+007\n";

    let result = Importer::new(&store)
        .import_csv(csv.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.errors[0].line, 3);
    assert_eq!(result.errors[0].field.as_deref(), Some("value"));
    assert_eq!(result.errors[1].line, 4);
    assert_eq!(result.errors[1].field.as_deref(), Some("key"));

    assert_eq!(store.value("bob").await, None);
    // values are normalized to their canonical decimal form
    assert_eq!(store.value("carol").await, Some(b"7".to_vec()));

    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_writes_nothing() -> Result<()> {
    let store = MemoryStore::new();
    let csv = "key,value\nalice,100\n";

    let result = Importer::new(&store)
        .import_csv(csv.as_bytes(), ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 1);
    assert!(store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn test_json_export_then_import() -> Result<()> {
    let (source, _temp) = test_store().await?;
    source.put("alice", b"110".to_vec()).await?;
    source.put("bob", b"-5".to_vec()).await?;

    let mut buffer = Vec::new();
    Exporter::new(&source).export_json(&mut buffer).await?;

    let (target, _temp2) = test_store().await?;
    let result = Importer::new(&target)
        .import_json(buffer.as_slice(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 2);
    assert_eq!(target.get("alice").await?, Some(b"110".to_vec()));
    assert_eq!(target.get("bob").await?, Some(b"-5".to_vec()));

    Ok(())
}

#[tokio::test]
async fn test_import_json_malformed() -> Result<()> {
    let store = MemoryStore::new();

    let result = Importer::new(&store)
        .import_json("not json".as_bytes(), ImportOptions::default())
        .await;

    assert!(result.is_err());
    Ok(())
}
