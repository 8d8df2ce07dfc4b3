//! Registration wizard business logic.
//!
//! The wizard is strictly linear:
//! `CollectWalletChoice → CollectProfileFields → VerifyOtp → Complete`.
//! Each call belongs to one step and may be repeated while the draft sits at that
//! step; calling it at any other step fails with [`Error::WizardStep`]. The draft
//! is persisted under `registrationData` after every step, the issued code under
//! `currentOTP`.
//!
//! Completion runs in one database transaction: the profile is created with the
//! welcome bonus as its balance, appended to the registry (phone numbers are not
//! deduplicated), the bonus is logged as income, the draft and code are discarded,
//! and the session is opened.

use crate::{
    config::wallet::WalletConfig,
    core::{
        auth, ledger,
        storage::{self, keys},
        validation,
    },
    errors::{Error, Result},
    models::{
        PinHash, RegistrationDraft, RegistrationStep, TransactionDraft, UserProfile,
        WalletProvider,
    },
    session::Session,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};

/// Fields submitted at the `CollectProfileFields` step.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
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
    /// Chosen PIN
    pub pin: String,
    /// PIN typed a second time
    pub confirm_pin: String,
    /// Terms and conditions checkbox
    pub accepted_terms: bool,
}

/// Timing of the code just issued, for the countdown display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpChallenge {
    /// When the code was issued
    pub issued_at: DateTime<Utc>,
    /// When a resend becomes possible
    pub resend_available_at: DateTime<Utc>,
    /// When the code stops being accepted, if it expires
    pub expires_at: Option<DateTime<Utc>>,
}

fn expect_step(draft: &RegistrationDraft, expected: RegistrationStep) -> Result<()> {
    if draft.step == expected {
        Ok(())
    } else {
        Err(Error::WizardStep {
            expected: expected.to_string(),
            actual: draft.step.to_string(),
        })
    }
}

async fn stored_draft<C>(db: &C) -> Result<RegistrationDraft>
where
    C: ConnectionTrait,
{
    Ok(storage::get(db, keys::REGISTRATION_DATA)
        .await?
        .unwrap_or_default())
}

/// Returns the draft in progress, or a fresh one at the first step.
pub async fn load_draft(db: &DatabaseConnection) -> Result<RegistrationDraft> {
    stored_draft(db).await
}

/// Step 1: records the wallet brand and advances to the profile form.
pub async fn choose_wallet(
    db: &DatabaseConnection,
    wallet: WalletProvider,
) -> Result<RegistrationDraft> {
    if wallet == WalletProvider::Google {
        return Err(Error::validation(
            "wallet",
            "Google accounts sign in directly and cannot register",
        ));
    }

    let mut draft = stored_draft(db).await?;
    expect_step(&draft, RegistrationStep::CollectWalletChoice)?;

    draft.wallet = Some(wallet);
    draft.step = RegistrationStep::CollectProfileFields;
    storage::put(db, keys::REGISTRATION_DATA, &draft).await?;
    Ok(draft)
}

fn validate_form(form: &ProfileForm) -> Result<(String, String, String)> {
    let first_name = validation::validate_name("first_name", &form.first_name)?;
    let last_name = validation::validate_name("last_name", &form.last_name)?;
    validation::validate_email(&form.email)?;
    let phone = validation::normalize_phone(&form.phone)?;

    if form.birth_date.is_none() {
        return Err(Error::validation("birth_date", "date of birth is required"));
    }

    validation::validate_pin(&form.pin)?;
    if form.pin != form.confirm_pin {
        return Err(Error::validation("confirm_pin", "PIN confirmation does not match"));
    }

    if !form.accepted_terms {
        return Err(Error::validation(
            "terms",
            "the terms and conditions must be accepted",
        ));
    }

    Ok((first_name, last_name, phone))
}

fn challenge(config: &WalletConfig, issued_at: DateTime<Utc>) -> OtpChallenge {
    OtpChallenge {
        issued_at,
        resend_available_at: issued_at + Duration::seconds(config.otp_resend_cooldown_secs),
        expires_at: config
            .otp_ttl_secs
            .map(|ttl| issued_at + Duration::seconds(ttl)),
    }
}

async fn issue_otp<C>(
    db: &C,
    config: &WalletConfig,
    draft: &mut RegistrationDraft,
    now: DateTime<Utc>,
) -> Result<OtpChallenge>
where
    C: ConnectionTrait,
{
    draft.otp_issued_at = Some(now);
    storage::put(db, keys::REGISTRATION_DATA, &*draft).await?;
    storage::put(db, keys::CURRENT_OTP, &config.otp_code).await?;
    info!("One-time password issued for draft {}", draft.id);
    Ok(challenge(config, now))
}

/// Step 2: validates the profile form, stores it, and issues the OTP.
///
/// Fields are checked in form order and the first failure is returned; nothing is
/// written on failure.
#[instrument(skip(db, config, form))]
pub async fn submit_profile(
    db: &DatabaseConnection,
    config: &WalletConfig,
    form: &ProfileForm,
    now: DateTime<Utc>,
) -> Result<(RegistrationDraft, OtpChallenge)> {
    let txn = db.begin().await?;

    let mut draft = stored_draft(&txn).await?;
    expect_step(&draft, RegistrationStep::CollectProfileFields)?;

    let (first_name, last_name, phone) = validate_form(form)?;

    draft.first_name = Some(first_name);
    draft.last_name = Some(last_name);
    draft.email = Some(form.email.clone());
    draft.phone = Some(phone);
    draft.birth_date = form.birth_date;
    draft.pin_hash = Some(PinHash::derive(&draft.id, &form.pin));
    draft.step = RegistrationStep::VerifyOtp;

    let otp = issue_otp(&txn, config, &mut draft, now).await?;
    txn.commit().await?;

    Ok((draft, otp))
}

/// Re-issues the OTP once the resend cooldown has run out.
pub async fn resend_otp(
    db: &DatabaseConnection,
    config: &WalletConfig,
    now: DateTime<Utc>,
) -> Result<OtpChallenge> {
    let txn = db.begin().await?;

    let mut draft = stored_draft(&txn).await?;
    expect_step(&draft, RegistrationStep::VerifyOtp)?;

    if let Some(issued_at) = draft.otp_issued_at {
        let available_at = challenge(config, issued_at).resend_available_at;
        if now < available_at {
            return Err(Error::OtpCooldown {
                remaining_secs: (available_at - now).num_seconds().max(1),
            });
        }
    }

    let otp = issue_otp(&txn, config, &mut draft, now).await?;
    txn.commit().await?;
    Ok(otp)
}

fn build_profile(
    draft: RegistrationDraft,
    config: &WalletConfig,
    now: DateTime<Utc>,
) -> Result<UserProfile> {
    let missing = |field: &str| Error::CorruptState {
        key: keys::REGISTRATION_DATA.to_string(),
        message: format!("draft at verify_otp is missing {field}"),
    };

    Ok(UserProfile {
        first_name: draft.first_name.ok_or_else(|| missing("first name"))?,
        last_name: draft.last_name.ok_or_else(|| missing("last name"))?,
        email: draft.email.ok_or_else(|| missing("email"))?,
        phone: Some(draft.phone.ok_or_else(|| missing("phone"))?),
        wallet: draft.wallet.ok_or_else(|| missing("wallet"))?,
        pin_hash: Some(draft.pin_hash.ok_or_else(|| missing("PIN"))?),
        avatar: None,
        balance: config.welcome_bonus,
        address: None,
        birth_date: draft.birth_date,
        created_at: now,
        is_verified: true,
        id: draft.id,
    })
}

/// Step 3: checks the entered code and, on a match, completes registration.
///
/// # Errors
/// - [`Error::WizardStep`] unless the draft is waiting for the OTP
/// - [`Error::Validation`] for input that is not six digits
/// - [`Error::Authentication`] if the code differs from the last one issued
/// - [`Error::OtpExpired`] if the code outlived its TTL
///
/// The draft is left untouched on every error.
#[instrument(skip(db, config, entered))]
pub async fn verify_otp(
    db: &DatabaseConnection,
    config: &WalletConfig,
    entered: &str,
    now: DateTime<Utc>,
) -> Result<Session> {
    let txn = db.begin().await?;

    let draft = stored_draft(&txn).await?;
    expect_step(&draft, RegistrationStep::VerifyOtp)?;
    validation::validate_otp(entered)?;

    let issued: Option<String> = storage::get(&txn, keys::CURRENT_OTP).await?;
    if issued.as_deref() != Some(entered) {
        warn!("OTP mismatch for draft {}", draft.id);
        return Err(Error::authentication("invalid one-time password"));
    }

    let expired = draft
        .otp_issued_at
        .and_then(|issued_at| challenge(config, issued_at).expires_at)
        .is_some_and(|expires_at| now > expires_at);
    if expired {
        return Err(Error::OtpExpired);
    }

    let profile = build_profile(draft, config, now)?;

    auth::register_user(&txn, &profile).await?;
    if config.welcome_bonus > 0 {
        let bonus = TransactionDraft::income(
            config.titles.welcome_bonus.as_str(),
            config.welcome_bonus,
        )
        .complete(now);
        ledger::prepend_record(&txn, bonus).await?;
    }
    storage::remove(&txn, keys::REGISTRATION_DATA).await?;
    storage::remove(&txn, keys::CURRENT_OTP).await?;
    auth::establish(&txn, &profile).await?;

    txn.commit().await?;

    info!("Registration completed for {}", profile.id);
    Ok(Session::new(profile))
}

/// Throws away an abandoned draft and its code.
pub async fn abandon(db: &DatabaseConnection) -> Result<()> {
    let txn = db.begin().await?;
    storage::remove(&txn, keys::REGISTRATION_DATA).await?;
    storage::remove(&txn, keys::CURRENT_OTP).await?;
    txn.commit().await?;
    Ok(())
}
