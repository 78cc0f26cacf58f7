//! The `days` query parameter shared by the listing and summary routes.

use serde::Deserialize;
use time::{Date, Duration};

/// Windows longer than this are treated as unbounded.
///
/// Large enough to cover every representable [Date], small enough that
/// [Duration::days] cannot overflow.
pub(crate) const MAX_WINDOW_DAYS: i64 = 10_000_000;

/// The query string for routes that accept a window size in days.
#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    /// The number of days in the window, if given.
    pub days: Option<i64>,
}

/// The earliest date to include when looking back `days` days from `today`.
///
/// `None` means no lower bound: the parameter was left out, or was zero or
/// negative.
pub fn lookback_start(today: Date, days: Option<i64>) -> Option<Date> {
    match days {
        Some(days) if days > 0 => Some(
            today
                .checked_sub(Duration::days(days.min(MAX_WINDOW_DAYS)))
                .unwrap_or(Date::MIN),
        ),
        _ => None,
    }
}
