//! Core business logic - framework-agnostic ledger, authentication, and wallet operations.

/// Login, logout, session resume, and the user registry
pub mod auth;
/// Profile, balance, and transaction log; the only money-movement path
pub mod ledger;
/// Theme preference
pub mod preferences;
/// Profile editing
pub mod profile;
/// Registration wizard and one-time passwords
pub mod registration;
/// Dashboard figures derived from the transaction log
pub mod report;
/// Versioned key/value persistence
pub mod storage;
/// Input field checks
pub mod validation;
/// Top-up, transfer, withdrawal, and the PIN gate
pub mod wallet;
