/// Database connection and table creation
pub mod database;

/// Wallet limits, fees, and OTP settings loaded from config.toml
pub mod wallet;
