//! Registration draft model.
//!
//! The draft accumulates new-user fields across the wizard and is persisted
//! under `registrationData` between steps. It carries its own profile id from
//! the first step on so the PIN can be hashed with its final salt.

use super::{PinHash, WalletProvider};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of the registration wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    /// Pick the wallet brand
    CollectWalletChoice,
    /// Names, contact, birth date, PIN
    CollectProfileFields,
    /// Enter the one-time password
    VerifyOtp,
    /// Account created
    Complete,
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectWalletChoice => "collect_wallet_choice",
            Self::CollectProfileFields => "collect_profile_fields",
            Self::VerifyOtp => "verify_otp",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Partial user profile collected by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    /// Id the profile will receive on completion
    pub id: String,
    /// Current wizard step
    pub step: RegistrationStep,
    /// Chosen wallet brand
    #[serde(default)]
    pub wallet: Option<WalletProvider>,
    /// Given name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Normalised phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Date of birth
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Digest of the chosen PIN, salted with `id`
    #[serde(default)]
    pub pin_hash: Option<PinHash>,
    /// When the current OTP was issued
    #[serde(default)]
    pub otp_issued_at: Option<DateTime<Utc>>,
}

impl RegistrationDraft {
    /// Starts an empty draft at the first step with a fresh profile id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: format!("user_{}", uuid::Uuid::new_v4().simple()),
            step: RegistrationStep::CollectWalletChoice,
            wallet: None,
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            birth_date: None,
            pin_hash: None,
            otp_issued_at: None,
        }
    }
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self::new()
    }
}
