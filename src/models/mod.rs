//! Typed records persisted by the ledger store.
//!
//! Every record is a closed serde type; values read back from storage are
//! decoded into these types and checked with their `validate` method before
//! anything else sees them.

/// User profile, wallet provider tag, and PIN digest
pub mod profile;
/// Registration wizard draft and its steps
pub mod registration;
/// Transaction records and drafts
pub mod transaction;

pub use profile::{PinHash, UserProfile, WalletProvider};
pub use registration::{RegistrationDraft, RegistrationStep};
pub use transaction::{TransactionDraft, TransactionKind, TransactionRecord, TransactionStatus};

use serde::{Deserialize, Serialize};

/// Display theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme (default)
    #[default]
    Light,
    /// Dark theme
    Dark,
}
