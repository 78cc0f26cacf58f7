//! Recurrence rules and the date arithmetic for stepping through them.

use std::{fmt, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

/// How often a transaction repeats.
///
/// Serialized with the variant names as-is, e.g. `"Monthly"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recurrence {
    /// A one-off transaction.
    #[default]
    No,
    /// Repeats every day.
    Daily,
    /// Repeats every seven days.
    Weekly,
    /// Repeats on the same day each calendar month, clamped to the length of
    /// shorter months.
    Monthly,
    /// Repeats on the same day each year. February 29 falls back to
    /// February 28 in common years.
    Yearly,
}

impl Recurrence {
    /// Every recurrence rule, in order of increasing period.
    pub const ALL: [Recurrence; 5] = [
        Recurrence::No,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Yearly,
    ];

    /// The name used for the rule in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Recurrence::No => "No",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
            Recurrence::Yearly => "Yearly",
        }
    }

    /// Whether the rule produces more than one occurrence.
    pub fn is_recurring(self) -> bool {
        self != Recurrence::No
    }

    /// The date of the occurrence after `date`.
    ///
    /// Returns `None` for [Recurrence::No], or if the next occurrence would
    /// fall after [Date::MAX].
    pub fn step(self, date: Date) -> Option<Date> {
        match self {
            Recurrence::No => None,
            Recurrence::Daily => date.checked_add(Duration::days(1)),
            Recurrence::Weekly => date.checked_add(Duration::weeks(1)),
            Recurrence::Monthly => add_one_month(date),
            Recurrence::Yearly => add_one_year(date),
        }
    }

    /// Step forward from `anchor` until the date is no earlier than `today`.
    ///
    /// The result is the same as repeatedly calling [Recurrence::step] while
    /// the date is before `today`. Returns `anchor` unchanged when it is not
    /// before `today`, and `None` when the series cannot reach `today`.
    pub fn fast_forward(self, anchor: Date, today: Date) -> Option<Date> {
        if anchor >= today {
            return Some(anchor);
        }

        match self {
            Recurrence::No => None,
            Recurrence::Daily => skip_fixed_period(anchor, today, 1),
            Recurrence::Weekly => skip_fixed_period(anchor, today, 7),
            // Clamping makes month and year steps depend on the path taken
            // (Jan 31 -> Feb 28 -> Mar 28), so these have to be walked.
            Recurrence::Monthly | Recurrence::Yearly => {
                let mut current = anchor;

                while current < today {
                    current = self.step(current)?;
                }

                Some(current)
            }
        }
    }

    /// The dates this rule places inside `start..=end` for a series anchored
    /// on `anchor`, in ascending order.
    ///
    /// Occurrences before `start` are skipped, including when `anchor` is
    /// long in the past. One-off transactions and empty windows yield nothing.
    pub fn occurrences_between(
        self,
        anchor: Date,
        start: Date,
        end: Date,
    ) -> impl Iterator<Item = Date> {
        let first = if self.is_recurring() && start <= end {
            self.fast_forward(anchor, start)
        } else {
            None
        };

        std::iter::successors(first, move |&date| self.step(date))
            .take_while(move |&date| date <= end)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when a string does not name a [Recurrence].
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a valid recurrence, expected one of No, Daily, Weekly, Monthly or Yearly")]
pub struct InvalidRecurrence(String);

impl FromStr for Recurrence {
    type Err = InvalidRecurrence;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recurrence::ALL
            .into_iter()
            .find(|recurrence| recurrence.as_str() == s)
            .ok_or_else(|| InvalidRecurrence(s.to_owned()))
    }
}

impl ToSql for Recurrence {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Recurrence {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The first date on or after `today` that is a whole number of `period_days`
/// after `anchor`.
fn skip_fixed_period(anchor: Date, today: Date, period_days: i64) -> Option<Date> {
    let days_behind = (today - anchor).whole_days();
    let periods = (days_behind + period_days - 1) / period_days;

    anchor.checked_add(Duration::days(periods * period_days))
}

fn add_one_month(date: Date) -> Option<Date> {
    let (year, month) = match date.month() {
        Month::December => (date.year().checked_add(1)?, Month::January),
        month => (date.year(), month.next()),
    };
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).ok()
}

fn add_one_year(date: Date) -> Option<Date> {
    let year = date.year().checked_add(1)?;
    let day = date.day().min(last_day_of_month(year, date.month()));

    Date::from_calendar_date(year, date.month(), day).ok()
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
