//! User profile model.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// E-wallet brand the account was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletProvider {
    /// DANA
    Dana,
    /// GoPay
    Gopay,
    /// OVO
    Ovo,
    /// ShopeePay
    Shopeepay,
    /// Google sign-in (no PIN, no phone)
    Google,
}

impl fmt::Display for WalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dana => "dana",
            Self::Gopay => "gopay",
            Self::Ovo => "ovo",
            Self::Shopeepay => "shopeepay",
            Self::Google => "google",
        };
        f.write_str(name)
    }
}

/// Salted SHA-256 digest of a 6-digit PIN, hex encoded.
///
/// The salt is the id of the profile owning the PIN, so equal PINs on two
/// accounts never produce equal digests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinHash(String);

impl PinHash {
    /// Hashes `pin` for the profile identified by `salt`.
    #[must_use]
    pub fn derive(salt: &str, pin: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b":");
        hasher.update(pin.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Whether `pin` hashes to this digest under `salt`.
    #[must_use]
    pub fn verify(&self, salt: &str, pin: &str) -> bool {
        Self::derive(salt, pin) == *self
    }

    fn is_well_formed(&self) -> bool {
        self.0.len() == 64 && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }
}

// never print the digest
impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinHash(..)")
    }
}

/// The account record: identity, PIN digest, balance, and free-form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique identifier (`user_...` or `google_...`)
    pub id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Normalised phone number without country prefix, absent for provider logins
    #[serde(default)]
    pub phone: Option<String>,
    /// Wallet brand
    pub wallet: WalletProvider,
    /// Digest of the 6-digit PIN, absent for provider logins
    #[serde(default)]
    pub pin_hash: Option<PinHash>,
    /// Avatar image URL
    #[serde(default)]
    pub avatar: Option<String>,
    /// Balance in minor currency units
    pub balance: i64,
    /// Postal address
    #[serde(default)]
    pub address: Option<String>,
    /// Date of birth
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Whether the phone number was confirmed by OTP
    #[serde(default)]
    pub is_verified: bool,
}

impl UserProfile {
    /// First and last name joined for display.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Compares `pin` against the stored digest; always false without a PIN.
    #[must_use]
    pub fn pin_matches(&self, pin: &str) -> bool {
        self.pin_hash
            .as_ref()
            .is_some_and(|hash| hash.verify(&self.id, pin))
    }

    /// Structural checks applied when a profile is read back from storage.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::validation("id", "profile id cannot be empty"));
        }
        if self
            .pin_hash
            .as_ref()
            .is_some_and(|hash| !hash.is_well_formed())
        {
            return Err(Error::validation("pin", "stored PIN digest is malformed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::sample_profile;

    #[test]
    fn test_pin_hash_is_salted() {
        let a = PinHash::derive("user_a", "123456");
        let b = PinHash::derive("user_b", "123456");
        assert_ne!(a, b);
        assert!(a.verify("user_a", "123456"));
        assert!(!a.verify("user_a", "654321"));
        assert!(a.is_well_formed());
    }

    #[test]
    fn test_pin_hash_debug_is_redacted() {
        let hash = PinHash::derive("user_a", "123456");
        assert_eq!(format!("{hash:?}"), "PinHash(..)");
    }

    #[test]
    fn test_profile_json_uses_camel_case() {
        let profile = sample_profile("123456", 50_000);
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("firstName").is_some());
        assert!(json.get("pinHash").is_some());
        assert_eq!(json["wallet"], "dana");
        assert_eq!(json["balance"], 50_000);
    }

    #[test]
    fn test_pin_matches_without_pin() {
        let mut profile = sample_profile("123456", 0);
        assert!(profile.pin_matches("123456"));
        profile.pin_hash = None;
        assert!(!profile.pin_matches("123456"));
    }

    #[test]
    fn test_validate_rejects_malformed_digest() {
        let mut profile = sample_profile("123456", 0);
        profile.pin_hash = Some(PinHash("not-a-digest".to_string()));
        assert!(matches!(
            profile.validate(),
            Err(Error::Validation { field: "pin", .. })
        ));
    }

    #[test]
    fn test_display_name() {
        let profile = sample_profile("123456", 0);
        assert_eq!(profile.display_name(), "Budi Santoso");
    }
}
