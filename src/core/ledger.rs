//! Ledger business logic - the active profile, its balance, and the transaction log.
//!
//! This module is the only path through which money moves. [`apply_money_movement`]
//! adds a balance delta to the active profile, mirrors the new balance into the
//! user registry, and prepends a completed transaction record, all inside one
//! database transaction with compare-and-swap writes. Either every write lands or
//! none does; a debit that would push the balance below zero is rejected against
//! the balance read inside the transaction, not against a caller's snapshot.

use crate::{
    core::{
        auth,
        storage::{self, keys},
    },
    errors::{Error, Result},
    models::{TransactionDraft, TransactionKind, TransactionRecord, UserProfile},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

/// Result of a committed money movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyMovement {
    /// Profile with its updated balance
    pub profile: UserProfile,
    /// The record appended to the log
    pub record: TransactionRecord,
}

/// Returns the active profile, or `None` when nobody is authenticated.
pub async fn get_profile<C>(db: &C) -> Result<Option<UserProfile>>
where
    C: ConnectionTrait,
{
    storage::get(db, keys::CURRENT_USER).await
}

/// Overwrites the active profile wholesale.
pub async fn save_profile<C>(db: &C, profile: &UserProfile) -> Result<()>
where
    C: ConnectionTrait,
{
    profile.validate()?;
    storage::put(db, keys::CURRENT_USER, profile).await?;
    Ok(())
}

/// Returns the transaction log, newest first.
pub async fn list_transactions<C>(db: &C) -> Result<Vec<TransactionRecord>>
where
    C: ConnectionTrait,
{
    Ok(storage::get(db, keys::TRANSACTIONS)
        .await?
        .unwrap_or_default())
}

/// Prepends `record` to the log. Records are not deduplicated by id.
pub async fn append_transaction(db: &DatabaseConnection, record: TransactionRecord) -> Result<()> {
    let txn = db.begin().await?;
    prepend_record(&txn, record).await?;
    txn.commit().await?;
    Ok(())
}

/// Prepends `record` to the log on an existing connection or transaction.
pub(crate) async fn prepend_record<C>(db: &C, record: TransactionRecord) -> Result<()>
where
    C: ConnectionTrait,
{
    record.validate()?;

    let current = storage::read::<_, Vec<TransactionRecord>>(db, keys::TRANSACTIONS).await?;
    let (mut log, version) = match current {
        Some(versioned) => (versioned.value, Some(versioned.version)),
        None => (Vec::new(), None),
    };

    log.insert(0, record);
    storage::compare_and_put(db, keys::TRANSACTIONS, &log, version).await?;
    Ok(())
}

/// Applies a balance delta to `owner`'s profile and logs the matching record as
/// one atomic unit.
///
/// `owner` is the id of the profile that authorized the movement; it must still
/// be the active profile when the transaction reads it. `delta` is positive for credits and negative for debits and must agree with
/// the draft's kind. The draft amount is what the log shows; it may differ from
/// `|delta|` when a fee is charged on top.
///
/// # Errors
/// - [`Error::Validation`] for a non-positive draft amount or a delta whose sign
///   disagrees with the draft kind
/// - [`Error::NotAuthenticated`] if there is no active profile or it is not `owner`
/// - [`Error::InsufficientFunds`] if a debit exceeds the stored balance
/// - [`Error::Conflict`] if another writer changed the profile or log meanwhile
#[instrument(skip(db, draft), fields(title = %draft.title))]
pub async fn apply_money_movement(
    db: &DatabaseConnection,
    owner: &str,
    delta: i64,
    draft: TransactionDraft,
) -> Result<MoneyMovement> {
    if draft.amount <= 0 {
        return Err(Error::validation(
            "amount",
            format!("must be greater than zero, got {}", draft.amount),
        ));
    }

    let sign_matches = match draft.kind {
        TransactionKind::Income => delta > 0,
        TransactionKind::Expense => delta < 0,
    };
    if !sign_matches {
        return Err(Error::validation(
            "amount",
            format!("delta {delta} does not match a {:?} record", draft.kind),
        ));
    }

    // Use a transaction to ensure atomicity
    let txn = db.begin().await?;

    let current = storage::read::<_, UserProfile>(&txn, keys::CURRENT_USER)
        .await?
        .ok_or(Error::NotAuthenticated)?;
    if current.value.id != owner {
        warn!(
            "Movement authorized by {} refused, active profile is {}",
            owner, current.value.id
        );
        return Err(Error::NotAuthenticated);
    }
    let mut profile = current.value;

    let new_balance = profile
        .balance
        .checked_add(delta)
        .ok_or_else(|| Error::validation("amount", "balance overflow"))?;

    if delta < 0 && new_balance < 0 {
        return Err(Error::InsufficientFunds {
            balance: profile.balance,
            required: -delta,
        });
    }

    profile.balance = new_balance;
    storage::compare_and_put(&txn, keys::CURRENT_USER, &profile, Some(current.version)).await?;
    auth::sync_registry_entry(&txn, &profile).await?;

    let record = draft.complete(Utc::now());
    prepend_record(&txn, record.clone()).await?;

    txn.commit().await?;

    info!(
        "Committed {} of {} for {}: balance now {}",
        record.title, delta, profile.id, profile.balance
    );

    Ok(MoneyMovement { profile, record })
}
