//! Shared test utilities for the wallet ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and signed-in sessions with sensible defaults.

use crate::{
    core::auth,
    errors::Result,
    models::{PinHash, UserProfile, WalletProvider},
    session::Session,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;

/// PIN of every profile built by [`sample_profile`] in tests.
pub const TEST_PIN: &str = "123456";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a verified profile with sensible defaults.
///
/// # Defaults
/// * `id`: `"user_test"`
/// * name: Budi Santoso, `budi@example.com`
/// * `phone`: `"81234567890"`
/// * `wallet`: Dana
pub fn sample_profile(pin: &str, balance: i64) -> UserProfile {
    let id = "user_test".to_string();
    UserProfile {
        pin_hash: Some(PinHash::derive(&id, pin)),
        id,
        first_name: "Budi".to_string(),
        last_name: "Santoso".to_string(),
        email: "budi@example.com".to_string(),
        phone: Some("81234567890".to_string()),
        wallet: WalletProvider::Dana,
        avatar: None,
        balance,
        address: None,
        birth_date: None,
        created_at: Utc::now(),
        is_verified: true,
    }
}

/// Sets up a database with [`sample_profile`] registered and signed in.
/// Returns (db, session) for wallet and profile tests.
pub async fn setup_with_session(balance: i64) -> Result<(DatabaseConnection, Session)> {
    let db = setup_test_db().await?;
    let profile = sample_profile(TEST_PIN, balance);
    auth::register_user(&db, &profile).await?;
    auth::establish(&db, &profile).await?;
    Ok((db, Session::new(profile)))
}
