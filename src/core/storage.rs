//! Versioned key/value storage - the persistence boundary of the ledger.
//!
//! Values are JSON documents stored under the well-known keys in [`keys`].
//! Reads decode into a typed record and run its [`StoredValue::validate`]
//! check, so malformed stored data surfaces as [`Error::CorruptState`] instead
//! of flowing into business logic. Writes come in two flavours: [`put`] is a
//! plain upsert, [`compare_and_put`] only succeeds if the key still carries the
//! version the caller read.
//!
//! All functions are generic over [`ConnectionTrait`] so they run equally on a
//! connection or inside a database transaction.

use crate::{
    entities::{LocalState, local_state},
    errors::{Error, Result},
    models::{RegistrationDraft, Theme, TransactionRecord, UserProfile},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::Expr};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

/// Well-known storage keys.
pub mod keys {
    /// Active profile
    pub const CURRENT_USER: &str = "currentUser";
    /// Session flag
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
    /// Registered profiles
    pub const USERS: &str = "users";
    /// Transaction log, newest first
    pub const TRANSACTIONS: &str = "transactions";
    /// In-progress registration
    pub const REGISTRATION_DATA: &str = "registrationData";
    /// Last issued one-time password
    pub const CURRENT_OTP: &str = "currentOTP";
    /// Display theme
    pub const THEME: &str = "theme";
}

/// Boundary check run on every value read back from storage.
pub trait StoredValue {
    /// Rejects values that decoded but break a record invariant.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl StoredValue for UserProfile {
    fn validate(&self) -> Result<()> {
        Self::validate(self)
    }
}

impl StoredValue for TransactionRecord {
    fn validate(&self) -> Result<()> {
        Self::validate(self)
    }
}

impl<T: StoredValue> StoredValue for Vec<T> {
    fn validate(&self) -> Result<()> {
        self.iter().try_for_each(StoredValue::validate)
    }
}

impl StoredValue for RegistrationDraft {}
impl StoredValue for Theme {}
impl StoredValue for String {}
impl StoredValue for bool {}

/// A decoded value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// Decoded value
    pub value: T,
    /// Row version at read time
    pub version: i64,
}

/// Reads and decodes `key`, returning its version alongside.
#[instrument(skip(db))]
pub async fn read<C, T>(db: &C, key: &str) -> Result<Option<Versioned<T>>>
where
    C: ConnectionTrait,
    T: DeserializeOwned + StoredValue,
{
    let Some(row) = LocalState::find_by_id(key.to_string()).one(db).await? else {
        debug!("Key '{}' is absent", key);
        return Ok(None);
    };

    let corrupt = |message: String| Error::CorruptState {
        key: key.to_string(),
        message,
    };

    let value: T = serde_json::from_str(&row.value).map_err(|e| corrupt(e.to_string()))?;
    value.validate().map_err(|e| corrupt(e.to_string()))?;

    debug!("Read key '{}' at version {}", key, row.version);
    Ok(Some(Versioned {
        value,
        version: row.version,
    }))
}

/// Reads and decodes `key`, dropping the version.
pub async fn get<C, T>(db: &C, key: &str) -> Result<Option<T>>
where
    C: ConnectionTrait,
    T: DeserializeOwned + StoredValue,
{
    Ok(read(db, key).await?.map(|versioned| versioned.value))
}

/// Writes `value` under `key` regardless of its current version.
///
/// Returns the new version.
#[instrument(skip(db, value))]
pub async fn put<C, T>(db: &C, key: &str, value: &T) -> Result<i64>
where
    C: ConnectionTrait,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    let now = Utc::now();

    let existing = LocalState::find_by_id(key.to_string()).one(db).await?;
    let version = if let Some(row) = existing {
        let next = row.version + 1;
        let mut active_model: local_state::ActiveModel = row.into();
        active_model.value = Set(json);
        active_model.version = Set(next);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
        next
    } else {
        insert_new(db, key, json).await?
    };

    debug!("Wrote key '{}' at version {}", key, version);
    Ok(version)
}

/// Writes `value` under `key` only if the key is still at `expected`.
///
/// `expected = None` means the key must not exist yet. A mismatch leaves the
/// row untouched and returns [`Error::Conflict`]. Returns the new version.
#[instrument(skip(db, value))]
pub async fn compare_and_put<C, T>(
    db: &C,
    key: &str,
    value: &T,
    expected: Option<i64>,
) -> Result<i64>
where
    C: ConnectionTrait,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    let conflict = || Error::Conflict {
        key: key.to_string(),
    };

    let Some(expected) = expected else {
        if LocalState::find_by_id(key.to_string())
            .one(db)
            .await?
            .is_some()
        {
            return Err(conflict());
        }
        let version = insert_new(db, key, json).await?;
        debug!("Created key '{}' at version {}", key, version);
        return Ok(version);
    };

    let next = expected + 1;
    let result = LocalState::update_many()
        .col_expr(local_state::Column::Value, Expr::value(json))
        .col_expr(local_state::Column::Version, Expr::value(next))
        .col_expr(local_state::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(local_state::Column::Key.eq(key))
        .filter(local_state::Column::Version.eq(expected))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(conflict());
    }

    debug!("Swapped key '{}' from version {} to {}", key, expected, next);
    Ok(next)
}

/// Deletes `key`; a missing key is not an error.
#[instrument(skip(db))]
pub async fn remove<C>(db: &C, key: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    LocalState::delete_by_id(key.to_string()).exec(db).await?;
    Ok(())
}

async fn insert_new<C>(db: &C, key: &str, json: String) -> Result<i64>
where
    C: ConnectionTrait,
{
    let row = local_state::ActiveModel {
        key: Set(key.to_string()),
        value: Set(json),
        version: Set(1),
        updated_at: Set(Utc::now()),
    };
    LocalState::insert(row).exec(db).await?;
    Ok(1)
}
