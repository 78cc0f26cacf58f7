//! Identifier types for stored transactions and projected occurrences.

use std::{fmt, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{Date, macros::format_description};
use uuid::Uuid;

/// The ID of a stored transaction.
///
/// Assigned by the server when the transaction is created and never changed
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a fresh, random ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TransactionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The ID of a projected occurrence of a recurring transaction.
///
/// Occurrences are never stored, so this ID is derived from the transaction
/// the occurrence was projected from and the date it falls on. It is written
/// as `<transaction ID>:<YYYY-MM-DD>`, which never parses as a
/// [TransactionId].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceId {
    /// The stored transaction the occurrence was projected from.
    pub source: TransactionId,
    /// The date of the occurrence.
    pub date: Date,
}

impl OccurrenceId {
    /// Create the ID for the occurrence of `source` on `date`.
    pub fn new(source: TransactionId, date: Date) -> Self {
        Self { source, date }
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.date)
    }
}

/// The error returned when a string is not a valid [OccurrenceId].
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a valid occurrence ID")]
pub struct InvalidOccurrenceId(String);

impl FromStr for OccurrenceId {
    type Err = InvalidOccurrenceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidOccurrenceId(s.to_owned());
        let (source, date) = s.split_once(':').ok_or_else(invalid)?;
        let source = source.parse().map_err(|_| invalid())?;
        let date = Date::parse(date, format_description!("[year]-[month]-[day]"))
            .map_err(|_| invalid())?;

        Ok(Self { source, date })
    }
}

impl Serialize for OccurrenceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OccurrenceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::database_id::{OccurrenceId, TransactionId};

    #[test]
    fn occurrence_id_is_not_a_transaction_id() {
        let source = TransactionId::generate();
        let occurrence_id = OccurrenceId::new(source, date!(2025 - 03 - 31));

        let text = occurrence_id.to_string();

        assert_eq!(text, format!("{source}:2025-03-31"));
        assert!(text.parse::<TransactionId>().is_err());
    }

    #[test]
    fn parses_occurrence_id() {
        let source = TransactionId::generate();
        let text = format!("{source}:2024-02-29");

        let got = text.parse::<OccurrenceId>();

        assert_eq!(got, Ok(OccurrenceId::new(source, date!(2024 - 02 - 29))));
    }

    #[test]
    fn rejects_malformed_occurrence_id() {
        assert!("2024-02-29".parse::<OccurrenceId>().is_err());
        assert!("not-a-uuid:2024-02-29".parse::<OccurrenceId>().is_err());

        let source = TransactionId::generate();
        assert!(format!("{source}:2023-02-29").parse::<OccurrenceId>().is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(TransactionId::generate(), TransactionId::generate());
    }
}
