// ABOUTME: Backup ledger types recording original field values.
// ABOUTME: Serialized into the run document for later restoration.

use crate::types::{DocId, DocTypeName, FieldName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::UpdateError;

/// One backed-up field value, taken before the corresponding write.
///
/// An absent original is recorded as JSON `null` and restored as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBackup {
    pub doctype: DocTypeName,
    pub doc: DocId,
    pub field: FieldName,
    pub original: Value,
}

/// Ordered record of every backup taken during a run.
///
/// Entries are appended in apply order; restoration walks them in reverse
/// so later writes to the same field are undone first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupLedger {
    entries: Vec<FieldBackup>,
}

impl BackupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, backup: FieldBackup) {
        self.entries.push(backup);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FieldBackup] {
        &self.entries
    }

    /// Entries in restoration order (most recent first).
    pub fn iter_rev(&self) -> impl Iterator<Item = &FieldBackup> {
        self.entries.iter().rev()
    }

    /// Serialize for storage in the run document's backup field.
    pub fn to_json(&self) -> Result<String, UpdateError> {
        serde_json::to_string(&self.entries).map_err(|e| UpdateError::LedgerEncoding(e.to_string()))
    }

    /// Deserialize from the run document's backup field.
    pub fn from_json(json: &str) -> Result<Self, UpdateError> {
        let entries =
            serde_json::from_str(json).map_err(|e| UpdateError::LedgerEncoding(e.to_string()))?;
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backup(doc: &str, field: &str, original: Value) -> FieldBackup {
        FieldBackup {
            doctype: DocTypeName::new("Customer").unwrap(),
            doc: DocId::new(doc),
            field: FieldName::new(field).unwrap(),
            original,
        }
    }

    #[test]
    fn ledger_round_trips_through_json() {
        let mut ledger = BackupLedger::new();
        ledger.push(backup("CUST-0001", "customer_group", "Retail".into()));
        ledger.push(backup("CUST-0002", "customer_group", Value::Null));

        let json = ledger.to_json().unwrap();
        let restored = BackupLedger::from_json(&json).unwrap();

        assert_eq!(restored.entries(), ledger.entries());
    }

    #[test]
    fn iter_rev_yields_most_recent_first() {
        let mut ledger = BackupLedger::new();
        ledger.push(backup("CUST-0001", "status", "Open".into()));
        ledger.push(backup("CUST-0002", "status", "Open".into()));

        let docs: Vec<&str> = ledger.iter_rev().map(|b| b.doc.as_str()).collect();
        assert_eq!(docs, vec!["CUST-0002", "CUST-0001"]);
    }

    #[test]
    fn corrupt_json_is_an_encoding_error() {
        let err = BackupLedger::from_json("not json").unwrap_err();
        assert!(matches!(err, UpdateError::LedgerEncoding(_)));
    }
}
