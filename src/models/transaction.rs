//! Transaction record model.
//!
//! Records are immutable once created. The ledger builds them from a
//! [`TransactionDraft`] at commit time, stamping the id, timestamp, and status.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money credited to the wallet
    Income,
    /// Money debited from the wallet
    Expense,
}

/// Outcome of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Completed
    Success,
    /// Rejected or aborted
    Failed,
}

/// One entry of the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier (`txn_...`)
    pub id: String,
    /// When the transaction was committed (ISO-8601)
    pub date: DateTime<Utc>,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Human-readable title (e.g. "Top Up")
    pub title: String,
    /// Positive amount in minor currency units
    pub amount: i64,
    /// Outcome
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Structural checks applied when records are read back from storage.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::validation("id", "transaction id cannot be empty"));
        }
        if self.amount <= 0 {
            return Err(Error::validation(
                "amount",
                format!("transaction amount must be positive, got {}", self.amount),
            ));
        }
        Ok(())
    }

    /// Amount with its sign applied: positive for income, negative for expense.
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// The caller-supplied part of a transaction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Income or expense
    pub kind: TransactionKind,
    /// Human-readable title
    pub title: String,
    /// Positive amount in minor currency units
    pub amount: i64,
}

impl TransactionDraft {
    /// Creates an income draft.
    pub fn income(title: impl Into<String>, amount: i64) -> Self {
        Self {
            kind: TransactionKind::Income,
            title: title.into(),
            amount,
        }
    }

    /// Creates an expense draft.
    pub fn expense(title: impl Into<String>, amount: i64) -> Self {
        Self {
            kind: TransactionKind::Expense,
            title: title.into(),
            amount,
        }
    }

    /// Completes the draft into a successful record stamped at `now`.
    #[must_use]
    pub fn complete(self, now: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            id: format!("txn_{}", uuid::Uuid::new_v4().simple()),
            date: now,
            kind: self.kind,
            title: self.title,
            amount: self.amount,
            status: TransactionStatus::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let record = TransactionDraft::expense("Transfer ke Siti", 25_000).complete(Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["status"], "success");
        assert_eq!(json["amount"], 25_000);
        assert!(json["id"].as_str().unwrap().starts_with("txn_"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let raw = r#"{"id":"txn_1","date":"2025-01-01T00:00:00Z","type":"refund","title":"x","amount":1,"status":"success"}"#;
        assert!(serde_json::from_str::<TransactionRecord>(raw).is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let mut record = TransactionDraft::income("Top Up", 1).complete(Utc::now());
        record.amount = 0;
        assert!(matches!(
            record.validate(),
            Err(Error::Validation {
                field: "amount",
                ..
            })
        ));
    }

    #[test]
    fn test_signed_amount() {
        let now = Utc::now();
        assert_eq!(TransactionDraft::income("a", 5).complete(now).signed_amount(), 5);
        assert_eq!(TransactionDraft::expense("b", 5).complete(now).signed_amount(), -5);
    }

    #[test]
    fn test_complete_generates_distinct_ids() {
        let now = Utc::now();
        let a = TransactionDraft::income("a", 5).complete(now);
        let b = TransactionDraft::income("a", 5).complete(now);
        assert_ne!(a.id, b.id);
    }
}
