//! Projecting recurring transactions onto the dates they will happen next.
//!
//! Nothing here touches the database: the functions take stored transactions
//! and a window, and return occurrences that only exist in the response.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error,
    database_id::{OccurrenceId, TransactionId},
    recurrence::Recurrence,
    transaction::{Transaction, TransactionType},
};

/// The window size used when the caller does not give one.
pub const DEFAULT_UPCOMING_DAYS: i64 = 30;

/// The window size used when the caller asks for zero or fewer days.
///
/// This is roughly two years rather than an empty window.
pub const FALLBACK_UPCOMING_DAYS: i64 = 730;

/// The largest window a caller may ask for, roughly ten years.
///
/// Every occurrence in the window is built in memory, so a daily series
/// yields one entry per day.
pub const MAX_UPCOMING_DAYS: i64 = 3650;

/// The inclusive range of dates to project occurrences into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingWindow {
    /// The first date in the window, usually today.
    pub start: Date,
    /// The last date in the window.
    pub end: Date,
}

impl UpcomingWindow {
    /// The window from `today` to `days` days after today.
    ///
    /// `None` uses [DEFAULT_UPCOMING_DAYS] and zero or negative values use
    /// [FALLBACK_UPCOMING_DAYS].
    ///
    /// # Errors
    /// Returns [Error::Validation] if `days` is more than [MAX_UPCOMING_DAYS].
    pub fn from_days(today: Date, days: Option<i64>) -> Result<Self, Error> {
        let days = match days {
            None => DEFAULT_UPCOMING_DAYS,
            Some(days) if days <= 0 => FALLBACK_UPCOMING_DAYS,
            Some(days) if days > MAX_UPCOMING_DAYS => {
                return Err(Error::Validation(format!(
                    "days must be at most {MAX_UPCOMING_DAYS}, got {days}"
                )));
            }
            Some(days) => days,
        };

        Ok(Self {
            start: today,
            end: today.checked_add(Duration::days(days)).unwrap_or(Date::MAX),
        })
    }
}

/// One future occurrence of a recurring transaction.
///
/// Never stored. The `id` names the occurrence, `source_id` the stored
/// transaction it was projected from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedTransaction {
    /// Identifies the occurrence by its source transaction and date.
    pub id: OccurrenceId,
    /// The ID of the stored transaction this occurrence repeats.
    pub source_id: TransactionId,
    /// The category of the source transaction.
    pub category: String,
    /// The amount of the source transaction.
    pub amount: Decimal,
    /// The date of this occurrence.
    pub date: Date,
    /// The type of the source transaction.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The recurrence rule of the source transaction.
    pub recurring: Recurrence,
}

impl ProjectedTransaction {
    fn new(source: &Transaction, date: Date) -> Self {
        Self {
            id: OccurrenceId::new(source.id, date),
            source_id: source.id,
            category: source.category.clone(),
            amount: source.amount,
            date,
            kind: source.kind,
            recurring: source.recurring,
        }
    }
}

/// The occurrences of `transaction` that fall inside `window`, earliest
/// first.
///
/// The transaction's date anchors the series. Occurrences before the window
/// are skipped, so a series anchored long ago still shows up. One-off
/// transactions and empty windows give no occurrences.
pub fn project_occurrences(
    transaction: &Transaction,
    window: UpcomingWindow,
) -> Vec<ProjectedTransaction> {
    transaction
        .recurring
        .occurrences_between(transaction.date, window.start, window.end)
        .map(|date| ProjectedTransaction::new(transaction, date))
        .collect()
}

/// Every occurrence of the recurring `transactions` inside `window`, sorted by
/// date.
///
/// Occurrences on the same date keep the order of `transactions`.
pub fn upcoming_transactions(
    transactions: &[Transaction],
    window: UpcomingWindow,
) -> Vec<ProjectedTransaction> {
    let mut occurrences: Vec<_> = transactions
        .iter()
        .filter(|transaction| transaction.recurring.is_recurring())
        .flat_map(|transaction| project_occurrences(transaction, window))
        .collect();

    occurrences.sort_by_key(|occurrence| occurrence.date);

    occurrences
}
