//! Unified error types for the wallet ledger.
//!
//! Every failure aborts the attempt that produced it; nothing is retried and no
//! state is mutated on an error path.

use thiserror::Error;

/// All errors produced by the ledger, its handlers, and its storage layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad format or range on a user-supplied field.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// Credential, PIN, or OTP mismatch.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Human-readable reason
        message: String,
    },

    /// A debit exceeds the available balance.
    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Balance at the time of the check
        balance: i64,
        /// Amount the operation needed
        required: i64,
    },

    /// No active session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A registration step was submitted out of order.
    #[error("Registration is at step {actual}, expected {expected}")]
    WizardStep {
        /// Step the call belongs to
        expected: String,
        /// Step the draft is currently at
        actual: String,
    },

    /// PIN confirmation without a staged money movement.
    #[error("No pending action awaiting PIN confirmation")]
    NoPendingAction,

    /// The one-time password outlived its TTL.
    #[error("One-time password has expired")]
    OtpExpired,

    /// OTP resend requested while the cooldown is still running.
    #[error("One-time password can be resent in {remaining_secs}s")]
    OtpCooldown {
        /// Seconds until resend is allowed
        remaining_secs: i64,
    },

    /// A compare-and-swap write lost against a concurrent writer.
    #[error("Concurrent update detected on key '{key}'")]
    Conflict {
        /// Storage key that changed underneath the writer
        key: String,
    },

    /// Stored data failed to decode or validate.
    #[error("Corrupt stored state under '{key}': {message}")]
    CorruptState {
        /// Storage key holding the malformed value
        key: String,
        /// Decode or validation failure
        message: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON encoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::Authentication`].
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
