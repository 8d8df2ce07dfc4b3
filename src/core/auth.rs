//! Authentication business logic - user registry, login, and session lifecycle.
//!
//! Registered profiles live under `users`; the active session is the pair
//! `currentUser` + `isLoggedIn`. Nothing here is ambient: every function takes the
//! connection it works on and login calls hand back an explicit [`Session`].

use crate::{
    core::{
        storage::{self, keys},
        validation,
    },
    errors::{Error, Result},
    models::{UserProfile, WalletProvider},
    session::Session,
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/100";

/// Returns every registered profile in registration order.
pub async fn list_users<C>(db: &C) -> Result<Vec<UserProfile>>
where
    C: ConnectionTrait,
{
    Ok(storage::get(db, keys::USERS).await?.unwrap_or_default())
}

/// Appends `profile` to the registry.
///
/// Phone numbers are not deduplicated: registering the same number twice
/// leaves two entries, and login picks the first one that matches.
pub async fn register_user<C>(db: &C, profile: &UserProfile) -> Result<()>
where
    C: ConnectionTrait,
{
    profile.validate()?;

    let current = storage::read::<_, Vec<UserProfile>>(db, keys::USERS).await?;
    let (mut users, version) = match current {
        Some(versioned) => (versioned.value, Some(versioned.version)),
        None => (Vec::new(), None),
    };

    users.push(profile.clone());
    storage::compare_and_put(db, keys::USERS, &users, version).await?;
    Ok(())
}

/// Replaces every registry entry carrying `profile.id` with `profile`.
///
/// Profiles that never went through registration (provider logins) have no
/// entry; the call is then a no-op.
pub(crate) async fn sync_registry_entry<C>(db: &C, profile: &UserProfile) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some(current) = storage::read::<_, Vec<UserProfile>>(db, keys::USERS).await? else {
        return Ok(());
    };

    let mut users = current.value;
    let mut touched = false;
    for entry in users.iter_mut().filter(|entry| entry.id == profile.id) {
        *entry = profile.clone();
        touched = true;
    }

    if touched {
        storage::compare_and_put(db, keys::USERS, &users, Some(current.version)).await?;
    }
    Ok(())
}

/// Marks `profile` as the active session.
pub(crate) async fn establish<C>(db: &C, profile: &UserProfile) -> Result<()>
where
    C: ConnectionTrait,
{
    crate::core::ledger::save_profile(db, profile).await?;
    storage::put(db, keys::IS_LOGGED_IN, &true).await?;
    Ok(())
}

/// Logs in with phone and PIN against the registry.
///
/// # Errors
/// - [`Error::Validation`] if the phone or PIN is malformed (checked first)
/// - [`Error::Authentication`] if no registered user matches phone, PIN, and wallet
#[instrument(skip(db, pin))]
pub async fn login(
    db: &DatabaseConnection,
    wallet: WalletProvider,
    phone: &str,
    pin: &str,
) -> Result<Session> {
    let phone = validation::normalize_phone(phone)?;
    validation::validate_pin(pin)?;

    let users = list_users(db).await?;
    let Some(profile) = users.into_iter().find(|user| {
        user.wallet == wallet && user.phone.as_deref() == Some(phone.as_str()) && user.pin_matches(pin)
    }) else {
        warn!("Login rejected for {} on {}", phone, wallet);
        return Err(Error::authentication("phone number or PIN is incorrect"));
    };

    let txn = db.begin().await?;
    establish(&txn, &profile).await?;
    txn.commit().await?;

    info!("User {} logged in", profile.id);
    Ok(Session::new(profile))
}

/// Simulated Google sign-in: opens a session for a fresh PIN-less profile.
///
/// The profile is not added to the registry, so its balance only lives in the
/// session and it cannot confirm money movements (it has no PIN).
#[instrument(skip(db))]
pub async fn login_with_google(db: &DatabaseConnection) -> Result<Session> {
    let profile = UserProfile {
        id: format!("google_{}", uuid::Uuid::new_v4().simple()),
        first_name: "User".to_string(),
        last_name: "Google".to_string(),
        email: "user@gmail.com".to_string(),
        phone: None,
        wallet: WalletProvider::Google,
        pin_hash: None,
        avatar: Some(PLACEHOLDER_AVATAR.to_string()),
        balance: 0,
        address: None,
        birth_date: None,
        created_at: Utc::now(),
        is_verified: false,
    };

    let txn = db.begin().await?;
    establish(&txn, &profile).await?;
    txn.commit().await?;

    info!("Provider login opened session {}", profile.id);
    Ok(Session::new(profile))
}

/// Ends the active session. Ledger data and the registry are kept.
pub async fn logout(db: &DatabaseConnection) -> Result<()> {
    let txn = db.begin().await?;
    storage::remove(&txn, keys::CURRENT_USER).await?;
    storage::remove(&txn, keys::IS_LOGGED_IN).await?;
    txn.commit().await?;
    info!("Session closed");
    Ok(())
}

/// Restores the session persisted by an earlier login, if any.
///
/// Both the `isLoggedIn` flag and a decodable `currentUser` are required.
pub async fn resume<C>(db: &C) -> Result<Option<Session>>
where
    C: ConnectionTrait,
{
    let logged_in: bool = storage::get(db, keys::IS_LOGGED_IN).await?.unwrap_or(false);
    if !logged_in {
        return Ok(None);
    }

    let profile = crate::core::ledger::get_profile(db).await?;
    Ok(profile.map(Session::new))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{sample_profile, setup_test_db};

    #[tokio::test]
    async fn test_login_with_registered_user() -> Result<()> {
        let db = setup_test_db().await?;
        let profile = sample_profile("246810", 10_000);
        register_user(&db, &profile).await?;

        let session = login(&db, WalletProvider::Dana, "812-3456-7890", "246810").await?;
        assert_eq!(session.profile(), &profile);

        let resumed = resume(&db).await?.unwrap();
        assert_eq!(resumed.profile(), &profile);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_wrong_pin_or_wallet() -> Result<()> {
        let db = setup_test_db().await?;
        register_user(&db, &sample_profile("246810", 0)).await?;

        let wrong_pin = login(&db, WalletProvider::Dana, "81234567890", "111111").await;
        assert!(matches!(wrong_pin, Err(Error::Authentication { .. })));

        let wrong_wallet = login(&db, WalletProvider::Ovo, "81234567890", "246810").await;
        assert!(matches!(wrong_wallet, Err(Error::Authentication { .. })));

        assert!(resume(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_login_validates_format_first() -> Result<()> {
        let db = setup_test_db().await?;

        let bad_phone = login(&db, WalletProvider::Dana, "0123", "246810").await;
        assert!(matches!(bad_phone, Err(Error::Validation { field: "phone", .. })));

        let bad_pin = login(&db, WalletProvider::Dana, "81234567890", "12").await;
        assert!(matches!(bad_pin, Err(Error::Validation { field: "pin", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_same_phone_twice_keeps_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        let first = sample_profile("111111", 0);
        let mut second = sample_profile("222222", 0);
        second.id = "user_second".to_string();
        second.pin_hash = Some(crate::models::PinHash::derive(&second.id, "222222"));

        register_user(&db, &first).await?;
        register_user(&db, &second).await?;

        let users = list_users(&db).await?;
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].phone, users[1].phone);
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_clears_session() -> Result<()> {
        let db = setup_test_db().await?;
        login_with_google(&db).await?;
        assert!(resume(&db).await?.is_some());

        logout(&db).await?;
        assert!(resume(&db).await?.is_none());
        assert!(crate::core::ledger::get_profile(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_google_login_has_no_pin() -> Result<()> {
        let db = setup_test_db().await?;
        let session = login_with_google(&db).await?;
        assert_eq!(session.profile().wallet, WalletProvider::Google);
        assert!(!session.profile().pin_matches("123456"));
        assert!(list_users(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_resume_requires_flag() -> Result<()> {
        let db = setup_test_db().await?;
        crate::core::ledger::save_profile(&db, &sample_profile("123456", 0)).await?;
        assert!(resume(&db).await?.is_none());

        storage::put(&db, keys::IS_LOGGED_IN, &true).await?;
        assert!(resume(&db).await?.is_some());
        Ok(())
    }
}
