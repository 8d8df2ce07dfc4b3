//! Profile editing.
//!
//! Edits are applied to the stored profile, not the session snapshot, so a
//! balance committed from another session is never rolled back by a name change.

use crate::{
    core::{
        auth,
        storage::{self, keys},
        validation,
    },
    errors::{Error, Result},
    models::UserProfile,
    session::Session,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

/// Editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Phone number, any punctuation
    pub phone: String,
    /// Date of birth
    pub birth_date: Option<NaiveDate>,
    /// Postal address; blank clears it
    pub address: Option<String>,
}

/// Validates `changes` and writes them to the active profile and its registry entry.
pub async fn update_profile(
    db: &DatabaseConnection,
    session: &mut Session,
    changes: ProfileChanges,
) -> Result<UserProfile> {
    let first_name = validation::validate_name("first_name", &changes.first_name)?;
    let last_name = validation::validate_name("last_name", &changes.last_name)?;
    validation::validate_email(&changes.email)?;
    let phone = validation::normalize_phone(&changes.phone)?;

    let txn = db.begin().await?;

    let current = storage::read::<_, UserProfile>(&txn, keys::CURRENT_USER)
        .await?
        .ok_or(Error::NotAuthenticated)?;
    if current.value.id != session.profile().id {
        return Err(Error::NotAuthenticated);
    }

    let mut profile = current.value;
    profile.first_name = first_name;
    profile.last_name = last_name;
    profile.email = changes.email;
    profile.phone = Some(phone);
    profile.birth_date = changes.birth_date;
    profile.address = changes
        .address
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty());

    storage::compare_and_put(&txn, keys::CURRENT_USER, &profile, Some(current.version)).await?;
    auth::sync_registry_entry(&txn, &profile).await?;
    txn.commit().await?;

    info!("Profile {} updated", profile.id);
    session.refresh(profile.clone());
    Ok(profile)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger;
    use crate::models::TransactionDraft;
    use crate::test_utils::setup_with_session;

    fn changes() -> ProfileChanges {
        ProfileChanges {
            first_name: "Budi".to_string(),
            last_name: "Hartono".to_string(),
            email: "budi.h@example.com".to_string(),
            phone: "8129999000".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 31),
            address: Some(" Jl. Sudirman 5 ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_update_profile() -> Result<()> {
        let (db, mut session) = setup_with_session(10_000).await?;

        let profile = update_profile(&db, &mut session, changes()).await?;
        assert_eq!(profile.display_name(), "Budi Hartono");
        assert_eq!(profile.address.as_deref(), Some("Jl. Sudirman 5"));
        assert_eq!(session.profile(), &profile);
        assert_eq!(ledger::get_profile(&db).await?, Some(profile.clone()));

        let registry = auth::list_users(&db).await?;
        assert_eq!(registry[0], profile);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_committed_balance() -> Result<()> {
        let (db, mut session) = setup_with_session(10_000).await?;

        // balance moves behind the session's back
        let owner = session.profile().id.clone();
        ledger::apply_money_movement(&db, &owner, 5_000, TransactionDraft::income("Top Up", 5_000))
            .await?;

        let profile = update_profile(&db, &mut session, changes()).await?;
        assert_eq!(profile.balance, 15_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_email() -> Result<()> {
        let (db, mut session) = setup_with_session(10_000).await?;
        let before = ledger::get_profile(&db).await?;

        let result = update_profile(
            &db,
            &mut session,
            ProfileChanges {
                email: "nope".to_string(),
                ..changes()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { field: "email", .. })));
        assert_eq!(ledger::get_profile(&db).await?, before);
        Ok(())
    }
}
