//! Wallet configuration loading from config.toml
//!
//! Every threshold the money-movement handlers enforce (minimum amounts, fees,
//! the welcome bonus, OTP settings) lives here so none of them is a literal in
//! business logic. All fields are optional in the file and fall back to the
//! defaults of the demo wallet.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Wallet limits and fees
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Limits, fees, and OTP settings in minor currency units / seconds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WalletConfig {
    /// Smallest amount accepted by a transfer
    pub min_transfer: i64,
    /// Smallest amount accepted by a withdrawal
    pub min_withdrawal: i64,
    /// Fixed fee charged on every withdrawal
    pub withdrawal_fee: i64,
    /// Fee charged on top-ups (zero in the demo)
    pub topup_fee: i64,
    /// Amount credited by a top-up when none is given
    pub default_topup: i64,
    /// Initial balance credited on registration
    pub welcome_bonus: i64,
    /// The fixed code issued as one-time password
    pub otp_code: String,
    /// Seconds before the OTP may be resent
    pub otp_resend_cooldown_secs: i64,
    /// Seconds an issued OTP stays valid; `None` disables expiry
    pub otp_ttl_secs: Option<i64>,
    /// Titles written into the transaction log
    pub titles: TransactionTitles,
}

/// Titles of the records each money movement logs.
///
/// Titles are persisted with the record, so changing them does not rewrite
/// history.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransactionTitles {
    /// Top-up credit
    pub top_up: String,
    /// Prefix of a transfer; the recipient is appended after a space
    pub transfer_prefix: String,
    /// Cash withdrawal debit
    pub withdrawal: String,
    /// Registration bonus credit
    pub welcome_bonus: String,
}

impl Default for TransactionTitles {
    fn default() -> Self {
        Self {
            top_up: "Top Up".to_string(),
            transfer_prefix: "Transfer ke".to_string(),
            withdrawal: "Tarik Tunai".to_string(),
            welcome_bonus: "Bonus Selamat Datang".to_string(),
        }
    }
}

impl TransactionTitles {
    /// Title of a transfer to `recipient`.
    #[must_use]
    pub fn transfer(&self, recipient: &str) -> String {
        format!("{} {recipient}", self.transfer_prefix)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            min_transfer: 10_000,
            min_withdrawal: 50_000,
            withdrawal_fee: 2_500,
            topup_fee: 0,
            default_topup: 100_000,
            welcome_bonus: 10_000,
            otp_code: "123456".to_string(),
            otp_resend_cooldown_secs: 60,
            otp_ttl_secs: Some(300),
            titles: TransactionTitles::default(),
        }
    }
}

impl WalletConfig {
    /// Rejects settings that would make the handlers misbehave.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("min_transfer", self.min_transfer),
            ("min_withdrawal", self.min_withdrawal),
            ("withdrawal_fee", self.withdrawal_fee),
            ("topup_fee", self.topup_fee),
            ("welcome_bonus", self.welcome_bonus),
            ("otp_resend_cooldown_secs", self.otp_resend_cooldown_secs),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < 0) {
            return Err(Error::Config {
                message: format!("{name} must not be negative, got {value}"),
            });
        }

        if self.default_topup <= 0 {
            return Err(Error::Config {
                message: "default_topup must be positive".to_string(),
            });
        }

        if self.otp_code.len() != 6 || !self.otp_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Config {
                message: "otp_code must be exactly 6 digits".to_string(),
            });
        }

        if matches!(self.otp_ttl_secs, Some(ttl) if ttl <= 0) {
            return Err(Error::Config {
                message: "otp_ttl_secs must be positive when set".to_string(),
            });
        }

        let titles = [
            ("titles.top_up", &self.titles.top_up),
            ("titles.transfer_prefix", &self.titles.transfer_prefix),
            ("titles.withdrawal", &self.titles.withdrawal),
            ("titles.welcome_bonus", &self.titles.welcome_bonus),
        ];
        if let Some((name, _)) = titles.iter().find(|(_, title)| title.trim().is_empty()) {
            return Err(Error::Config {
                message: format!("{name} must not be blank"),
            });
        }

        Ok(())
    }
}

/// Loads wallet configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails [`WalletConfig::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading wallet configuration from {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    let config: Config = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    config.wallet.validate()?;
    Ok(config)
}

/// Loads configuration from ./config.toml, or the defaults if the file is absent
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!("No config.toml found, using default wallet settings");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_partial_wallet_config() {
        let toml_str = r#"
            [wallet]
            topup_fee = 1000
            otp_ttl_secs = 120
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.wallet.topup_fee, 1000);
        assert_eq!(config.wallet.otp_ttl_secs, Some(120));
        // untouched fields keep their defaults
        assert_eq!(config.wallet.min_transfer, 10_000);
        assert_eq!(config.wallet.withdrawal_fee, 2_500);
        assert_eq!(config.wallet.otp_code, "123456");
    }

    #[test]
    fn test_custom_titles() {
        let toml_str = r#"
            [wallet.titles]
            transfer_prefix = "Transfer to"
            withdrawal = "Cash Withdrawal"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.wallet.titles.transfer("Siti"), "Transfer to Siti");
        assert_eq!(config.wallet.titles.withdrawal, "Cash Withdrawal");
        assert_eq!(config.wallet.titles.top_up, "Top Up");
        assert!(config.wallet.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut config = WalletConfig::default();
        config.titles.withdrawal = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.wallet, WalletConfig::default());
        assert!(config.wallet.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_otp_code() {
        let config = WalletConfig {
            otp_code: "12ab56".to_string(),
            ..WalletConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_negative_fee() {
        let config = WalletConfig {
            withdrawal_fee: -1,
            ..WalletConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert_eq!(config.wallet, WalletConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
