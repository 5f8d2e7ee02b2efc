// ABOUTME: Integration tests for the rollback_changes procedure.
// ABOUTME: Tests restoring a completed run's values from the persisted ledger.

mod support;

use safeset::store::{DocFields, DocumentOps, MemoryStore};
use safeset::types::{DocId, RunId};
use safeset::update::{
    FIELD_BACKUP_DATA, FIELD_STATUS, BackupLedger, FieldBackup, UpdateError, UpdateRun,
    rollback_changes, run_doctype,
};
use serde_json::Value;

/// Run the configured update against the given documents and complete it.
async fn completed_run(store: &MemoryStore, docs: &[&str]) -> DocId {
    let run = UpdateRun::with_id(support::test_config("Customer"), RunId::new("run-1"));
    let mut run = run.begin(store).await.unwrap();
    for name in docs {
        run.apply_field(
            store,
            &DocId::new(*name),
            &support::field("customer_group"),
            &Value::from("Commercial"),
        )
        .await
        .unwrap();
    }
    let doc_id = run.doc_id();
    run.complete(store).await.expect("complete should succeed");
    doc_id
}

#[tokio::test]
async fn rollback_restores_originals_and_marks_run() {
    let store = MemoryStore::new();
    for (name, group) in [
        ("CUST-0001", "Retail"),
        ("CUST-0002", "Wholesale"),
        ("CUST-0003", "Retail"),
    ] {
        support::seed(
            &store,
            "Customer",
            name,
            &[("customer_group", Value::from(group))],
        )
        .await;
    }

    let run = completed_run(&store, &["CUST-0001", "CUST-0002", "CUST-0003"]).await;

    // All updated
    for name in ["CUST-0001", "CUST-0002", "CUST-0003"] {
        assert_eq!(
            support::value_of(&store, "Customer", name, "customer_group").await,
            Some(Value::from("Commercial"))
        );
    }

    let report = rollback_changes(&store, &run).await.unwrap();
    assert_eq!(report.message(), "Rolled back 3 records");

    // All restored
    assert_eq!(
        support::value_of(&store, "Customer", "CUST-0001", "customer_group").await,
        Some(Value::from("Retail"))
    );
    assert_eq!(
        support::value_of(&store, "Customer", "CUST-0002", "customer_group").await,
        Some(Value::from("Wholesale"))
    );
    assert_eq!(
        support::value_of(&store, "Customer", "CUST-0003", "customer_group").await,
        Some(Value::from("Retail"))
    );

    let fields = store.get_document(&run_doctype(), &run).await.unwrap();
    assert_eq!(fields.get(FIELD_STATUS), Some(&Value::from("Rolled Back")));
}

#[tokio::test]
async fn rollback_of_missing_run_is_run_not_found() {
    let store = MemoryStore::new();
    let err = rollback_changes(&store, &DocId::new("run-0404"))
        .await
        .unwrap_err();
    assert!(matches!(err, UpdateError::RunNotFound(_)));
}

#[tokio::test]
async fn rollback_without_backup_data_is_rejected() {
    let store = MemoryStore::new();

    let mut fields = DocFields::new();
    fields.insert(FIELD_STATUS.to_string(), Value::from("Completed"));
    store
        .insert_document(&run_doctype(), &DocId::new("run-1"), fields)
        .await
        .unwrap();

    let err = rollback_changes(&store, &DocId::new("run-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, UpdateError::NoBackupData(_)));
}

#[tokio::test]
async fn unrestorable_entries_are_skipped_not_fatal() {
    let store = MemoryStore::new();
    support::seed(
        &store,
        "Customer",
        "CUST-0001",
        &[("customer_group", Value::from("Commercial"))],
    )
    .await;

    // A ledger referencing one live document and one that never existed
    let mut ledger = BackupLedger::new();
    ledger.push(FieldBackup {
        doctype: support::doctype("Customer"),
        doc: DocId::new("CUST-0001"),
        field: support::field("customer_group"),
        original: Value::from("Retail"),
    });
    ledger.push(FieldBackup {
        doctype: support::doctype("Customer"),
        doc: DocId::new("CUST-0404"),
        field: support::field("customer_group"),
        original: Value::from("Retail"),
    });

    let mut fields = DocFields::new();
    fields.insert(FIELD_STATUS.to_string(), Value::from("Completed"));
    fields.insert(
        FIELD_BACKUP_DATA.to_string(),
        Value::from(ledger.to_json().unwrap()),
    );
    store
        .insert_document(&run_doctype(), &DocId::new("run-1"), fields)
        .await
        .unwrap();

    let report = rollback_changes(&store, &DocId::new("run-1"))
        .await
        .unwrap();

    assert_eq!(report.restored, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].doc, DocId::new("CUST-0404"));
    assert_eq!(report.message(), "Rolled back 1 records (1 skipped)");

    // The live document was still restored
    assert_eq!(
        support::value_of(&store, "Customer", "CUST-0001", "customer_group").await,
        Some(Value::from("Retail"))
    );
}

#[tokio::test]
async fn double_rollback_is_idempotent() {
    let store = MemoryStore::new();
    support::seed(
        &store,
        "Customer",
        "CUST-0001",
        &[("customer_group", Value::from("Retail"))],
    )
    .await;

    let run = completed_run(&store, &["CUST-0001"]).await;

    rollback_changes(&store, &run).await.unwrap();

    // A second rollback replays the same ledger: the values it restores
    // are already in place, so it succeeds idempotently.
    let report = rollback_changes(&store, &run).await.unwrap();
    assert_eq!(report.restored, 1);
    assert_eq!(
        support::value_of(&store, "Customer", "CUST-0001", "customer_group").await,
        Some(Value::from("Retail"))
    );
}
