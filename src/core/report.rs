//! Report generation business logic.
//!
//! This module derives the dashboard figures from the transaction log: the most
//! recent entries, income/expense totals for the trailing week, and a summary of
//! the current calendar month. The aggregation functions are pure and take the
//! reference time as a parameter; the async wrappers read the log first.

use crate::{
    core::ledger,
    errors::Result,
    models::{TransactionKind, TransactionRecord},
};
use chrono::{DateTime, Datelike, Duration, Utc};
use sea_orm::ConnectionTrait;

/// Number of entries the dashboard shows.
pub const DASHBOARD_RECENT_LIMIT: usize = 5;

/// Totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodSummary {
    /// Sum of income amounts
    pub income: i64,
    /// Sum of expense amounts
    pub expense: i64,
    /// Number of transactions
    pub count: usize,
}

impl PeriodSummary {
    /// Income minus expense, saturating at the `i64` bounds.
    #[must_use]
    pub const fn net(&self) -> i64 {
        self.income.saturating_sub(self.expense)
    }
}

/// Summary of the current calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport {
    /// Totals for the month
    pub summary: PeriodSummary,
    /// The month's transactions, newest first
    pub transactions: Vec<TransactionRecord>,
}

/// Everything the dashboard header needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Balance of the active profile, `None` without a session
    pub balance: Option<i64>,
    /// Latest transactions
    pub recent: Vec<TransactionRecord>,
    /// Trailing-week totals
    pub weekly: PeriodSummary,
}

/// Adds up income, expense, and count. Totals saturate instead of overflowing.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a TransactionRecord>) -> PeriodSummary {
    records
        .into_iter()
        .fold(PeriodSummary::default(), |mut summary, record| {
            match record.kind {
                TransactionKind::Income => {
                    summary.income = summary.income.saturating_add(record.amount);
                }
                TransactionKind::Expense => {
                    summary.expense = summary.expense.saturating_add(record.amount);
                }
            }
            summary.count += 1;
            summary
        })
}

/// Totals for transactions dated within the seven days before `now`.
#[must_use]
pub fn weekly_statistics(records: &[TransactionRecord], now: DateTime<Utc>) -> PeriodSummary {
    let week_ago = now - Duration::days(7);
    summarize(records.iter().filter(|record| record.date >= week_ago))
}

/// Transactions and totals for the calendar month containing `now`.
#[must_use]
pub fn monthly_report(records: &[TransactionRecord], now: DateTime<Utc>) -> MonthlyReport {
    let transactions: Vec<TransactionRecord> = records
        .iter()
        .filter(|record| record.date.year() == now.year() && record.date.month() == now.month())
        .cloned()
        .collect();

    MonthlyReport {
        summary: summarize(&transactions),
        transactions,
    }
}

/// The `limit` newest transactions.
pub async fn recent_transactions<C>(db: &C, limit: usize) -> Result<Vec<TransactionRecord>>
where
    C: ConnectionTrait,
{
    let mut log = ledger::list_transactions(db).await?;
    log.truncate(limit);
    Ok(log)
}

/// Balance, recent transactions, and weekly totals in one read.
pub async fn dashboard_summary<C>(db: &C, now: DateTime<Utc>) -> Result<DashboardSummary>
where
    C: ConnectionTrait,
{
    let balance = ledger::get_profile(db).await?.map(|profile| profile.balance);
    let log = ledger::list_transactions(db).await?;

    Ok(DashboardSummary {
        balance,
        weekly: weekly_statistics(&log, now),
        recent: log.into_iter().take(DASHBOARD_RECENT_LIMIT).collect(),
    })
}
