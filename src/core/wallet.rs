//! Wallet business logic - top-ups, transfers, and withdrawals.
//!
//! Every money movement goes through two calls. A `request_*` function checks the
//! amount against the configured limits and the session's balance snapshot and
//! stages the movement in the session. [`confirm_pin`] then re-collects the PIN;
//! a match executes the staged movement exactly once through
//! [`ledger::apply_money_movement`] and clears it, a mismatch leaves it staged and
//! unexecuted. There is no lockout on repeated mismatches.

use crate::{
    config::wallet::WalletConfig,
    core::{
        ledger::{self, MoneyMovement},
        validation,
    },
    errors::{Error, Result},
    models::TransactionDraft,
    session::{PendingAction, Session},
};
use sea_orm::DatabaseConnection;
use tracing::{info, instrument, warn};

/// Amount, fee, and total shown before confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Amount the user asked for
    pub amount: i64,
    /// Fee charged on top
    pub fee: i64,
    /// `amount + fee`
    pub total: i64,
}

impl FeeQuote {
    const fn new(amount: i64, fee: i64) -> Self {
        Self {
            amount,
            fee,
            total: amount.saturating_add(fee),
        }
    }
}

/// Quote for a top-up; `None` uses the configured default amount.
#[must_use]
pub fn quote_topup(config: &WalletConfig, amount: Option<i64>) -> FeeQuote {
    FeeQuote::new(amount.unwrap_or(config.default_topup), config.topup_fee)
}

/// Quote for a transfer. Transfers carry no fee.
#[must_use]
pub const fn quote_transfer(amount: i64) -> FeeQuote {
    FeeQuote::new(amount, 0)
}

/// Quote for a withdrawal with the fixed configured fee.
#[must_use]
pub const fn quote_withdraw(config: &WalletConfig, amount: i64) -> FeeQuote {
    FeeQuote::new(amount, config.withdrawal_fee)
}

/// Stages a top-up of `amount` (default from config when `None`).
pub fn request_topup<'s>(
    session: &'s mut Session,
    config: &WalletConfig,
    amount: Option<i64>,
) -> Result<&'s PendingAction> {
    let quote = quote_topup(config, amount);
    validation::validate_amount(quote.amount)?;

    Ok(session.stage(PendingAction::TopUp {
        amount: quote.amount,
        fee: quote.fee,
    }))
}

/// Stages a transfer of `amount` to `recipient`.
///
/// # Errors
/// - [`Error::Validation`] below the minimum transfer or with an empty recipient
/// - [`Error::InsufficientFunds`] if `amount` exceeds the session balance
pub fn request_transfer<'s>(
    session: &'s mut Session,
    config: &WalletConfig,
    amount: i64,
    recipient: &str,
) -> Result<&'s PendingAction> {
    let recipient = validation::validate_name("recipient", recipient)?;

    if amount < config.min_transfer {
        return Err(Error::validation(
            "amount",
            format!("minimum transfer is {}", config.min_transfer),
        ));
    }

    let quote = quote_transfer(amount);
    if quote.total > session.balance() {
        return Err(Error::InsufficientFunds {
            balance: session.balance(),
            required: quote.total,
        });
    }

    Ok(session.stage(PendingAction::Transfer { amount, recipient }))
}

/// Stages a withdrawal of `amount`; the fee is debited on top.
///
/// # Errors
/// - [`Error::Validation`] below the minimum withdrawal
/// - [`Error::InsufficientFunds`] if `amount + fee` exceeds the session balance
pub fn request_withdraw<'s>(
    session: &'s mut Session,
    config: &WalletConfig,
    amount: i64,
) -> Result<&'s PendingAction> {
    if amount < config.min_withdrawal {
        return Err(Error::validation(
            "amount",
            format!("minimum withdrawal is {}", config.min_withdrawal),
        ));
    }

    let quote = quote_withdraw(config, amount);
    if quote.total > session.balance() {
        return Err(Error::InsufficientFunds {
            balance: session.balance(),
            required: quote.total,
        });
    }

    Ok(session.stage(PendingAction::Withdraw {
        amount,
        fee: quote.fee,
    }))
}

/// PIN gate: executes the staged action if `pin` matches the profile's PIN.
///
/// # Errors
/// - [`Error::NoPendingAction`] if nothing is staged
/// - [`Error::Validation`] if `pin` is not six digits (action stays staged)
/// - [`Error::Authentication`] on a wrong PIN (action stays staged)
/// - [`Error::NotAuthenticated`] if another profile became active after the
///   session was opened; the action is cleared and nothing moves
/// - any error of [`ledger::apply_money_movement`]; the action is cleared
#[instrument(skip(db, config, session, pin), fields(user = %session.profile().id))]
pub async fn confirm_pin(
    db: &DatabaseConnection,
    config: &WalletConfig,
    session: &mut Session,
    pin: &str,
) -> Result<MoneyMovement> {
    if session.pending().is_none() {
        return Err(Error::NoPendingAction);
    }

    validation::validate_pin(pin)?;

    if !session.profile().pin_matches(pin) {
        warn!("PIN mismatch, pending action kept");
        return Err(Error::authentication("incorrect PIN"));
    }

    let action = session.take_pending().ok_or(Error::NoPendingAction)?;
    let movement = execute(db, config, &session.profile().id, action).await?;

    session.refresh(movement.profile.clone());
    info!("PIN confirmed, {} committed", movement.record.title);
    Ok(movement)
}

async fn execute(
    db: &DatabaseConnection,
    config: &WalletConfig,
    owner: &str,
    action: PendingAction,
) -> Result<MoneyMovement> {
    let titles = &config.titles;
    match action {
        PendingAction::TopUp { amount, .. } => {
            let draft = TransactionDraft::income(titles.top_up.as_str(), amount);
            ledger::apply_money_movement(db, owner, amount, draft).await
        }
        PendingAction::Transfer { amount, recipient } => {
            let draft = TransactionDraft::expense(titles.transfer(&recipient), amount);
            ledger::apply_money_movement(db, owner, -amount, draft).await
        }
        PendingAction::Withdraw { amount, fee } => {
            let draft = TransactionDraft::expense(titles.withdrawal.as_str(), amount);
            ledger::apply_money_movement(db, owner, -(amount + fee), draft).await
        }
    }
}
