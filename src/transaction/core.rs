//! Defines the core data models and database queries for transactions.

use std::{fmt, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionId, recurrence::Recurrence};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. wages.
    Income,
    /// Money spent, e.g. rent.
    Expense,
}

impl TransactionType {
    /// The name used for the type in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when a string does not name a [TransactionType].
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a valid transaction type, expected income or expense")]
pub struct InvalidTransactionType(String);

impl FromStr for TransactionType {
    type Err = InvalidTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A label for what the transaction was for, e.g. "Groceries".
    pub category: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: Decimal,
    /// When the transaction happened, or the first time it happens for
    /// recurring transactions.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// How often the transaction repeats.
    pub recurring: Recurrence,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        category: &str,
        amount: Decimal,
        date: Date,
        kind: TransactionType,
    ) -> TransactionBuilder {
        TransactionBuilder {
            category: category.to_owned(),
            amount,
            date,
            kind,
            recurring: Recurrence::No,
        }
    }
}

/// Every field of a [Transaction] except its ID.
///
/// This is both the request body for creating or replacing a transaction and
/// the input to [create_transaction] and [update_transaction].
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// A label for what the transaction was for. Must not be blank.
    pub category: String,

    /// The monetary amount of the transaction.
    pub amount: Decimal,

    /// The date when the transaction occurred.
    ///
    /// For recurring transactions this is the anchor that every projected
    /// occurrence is counted from.
    pub date: Date,

    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// How often the transaction repeats. Defaults to [Recurrence::No].
    #[serde(default)]
    pub recurring: Recurrence,
}

impl TransactionBuilder {
    /// Set the recurrence rule for the transaction.
    pub fn recurring(mut self, recurring: Recurrence) -> Self {
        self.recurring = recurring;
        self
    }

    /// Trim the category and check it is not empty.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the category is blank.
    pub fn validate(mut self) -> Result<Self, Error> {
        let category = self.category.trim();

        if category.is_empty() {
            return Err(Error::Validation("category cannot be empty".to_owned()));
        }

        if category.len() != self.category.len() {
            self.category = category.to_owned();
        }

        Ok(self)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION: &str =
    "SELECT id, category, amount, date, type, recurring FROM \"transaction\"";

/// Create a new transaction in the database from a builder.
///
/// A fresh ID is generated for the transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (id, category, amount, date, type, recurring)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, category, amount, date, type, recurring",
        )?
        .query_row(
            params![
                TransactionId::generate(),
                builder.category,
                builder.amount.to_string(),
                builder.date,
                builder.kind,
                builder.recurring,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Defines how transactions should be fetched from [query_transactions].
#[derive(Debug, Default)]
pub struct TransactionQuery {
    /// Only include transactions on or after this date.
    pub min_date: Option<Date>,
    /// Only include transactions whose recurrence is not [Recurrence::No].
    pub recurring_only: bool,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they were created.
    ///
    /// Transactions on the same date are always kept in creation order.
    pub sort_date: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of decreasing value.
    Descending,
}

/// Query for transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is a SQL error.
pub fn query_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut where_clause_parts = vec!["(:min_date IS NULL OR date >= :min_date)"];

    if query.recurring_only {
        where_clause_parts.push("recurring != 'No'");
    }

    let order_by = match query.sort_date {
        Some(SortOrder::Descending) => "date DESC, seq ASC",
        None => "seq ASC",
    };

    let sql = format!(
        "{SELECT_TRANSACTION} WHERE {} ORDER BY {order_by}",
        where_clause_parts.join(" AND ")
    );

    connection
        .prepare(&sql)?
        .query_map(&[(":min_date", &query.min_date)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace every field of the transaction `id` with the fields in `builder`.
///
/// The transaction keeps its ID and its place in creation order.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "UPDATE \"transaction\"
             SET category = ?1, amount = ?2, date = ?3, type = ?4, recurring = ?5
             WHERE id = ?6
             RETURNING id, category, amount, date, type, recurring",
        )?
        .query_row(
            params![
                builder.category,
                builder.amount.to_string(),
                builder.date,
                builder.kind,
                builder.recurring,
                id,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// `seq` records creation order, which breaks ties between transactions on
/// the same date.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                category TEXT NOT NULL CHECK(length(trim(category)) > 0),
                amount TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK(type IN ('income', 'expense')),
                recurring TEXT NOT NULL
                    CHECK(recurring IN ('No', 'Daily', 'Weekly', 'Monthly', 'Yearly'))
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let category = row.get(1)?;
    let raw_amount: String = row.get(2)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error))
    })?;
    let date = row.get(3)?;
    let kind = row.get(4)?;
    let recurring = row.get(5)?;

    Ok(Transaction {
        id,
        category,
        amount,
        date,
        kind,
        recurring,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        database_id::TransactionId,
        db::initialize,
        recurrence::Recurrence,
        transaction::{
            SortOrder, Transaction, TransactionQuery, TransactionType, count_transactions,
            create_transaction, delete_transaction, get_transaction, query_transactions,
            update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = Decimal::new(123, 1);

        let result = create_transaction(
            Transaction::build(
                "Coffee",
                amount,
                date!(2025 - 10 - 05),
                TransactionType::Expense,
            )
            .recurring(Recurrence::Daily),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.category, "Coffee");
                assert_eq!(transaction.recurring, Recurrence::Daily);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_assigns_unique_ids() {
        let conn = get_test_connection();
        let builder = Transaction::build(
            "Coffee",
            Decimal::ONE,
            date!(2025 - 10 - 05),
            TransactionType::Expense,
        );

        let first = create_transaction(builder.clone(), &conn).unwrap();
        let second = create_transaction(builder, &conn).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn amounts_keep_exact_decimal_value() {
        let conn = get_test_connection();
        let amount = Decimal::new(1_000_000_000_001, 2);

        let created = create_transaction(
            Transaction::build(
                "Lottery",
                amount,
                date!(2025 - 10 - 05),
                TransactionType::Income,
            ),
            &conn,
        )
        .unwrap();

        let got = get_transaction(created.id, &conn).unwrap();
        assert_eq!(got.amount, amount);
    }

    #[test]
    fn get_missing_transaction_is_not_found() {
        let conn = get_test_connection();

        let result = get_transaction(TransactionId::generate(), &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn query_sorts_by_date_descending_with_creation_order_ties() {
        let conn = get_test_connection();
        let build = |category: &str, date| {
            Transaction::build(category, Decimal::ONE, date, TransactionType::Expense)
        };
        let first = create_transaction(build("a", date!(2025 - 10 - 01)), &conn).unwrap();
        let second = create_transaction(build("b", date!(2025 - 10 - 03)), &conn).unwrap();
        let third = create_transaction(build("c", date!(2025 - 10 - 01)), &conn).unwrap();

        let got = query_transactions(
            &TransactionQuery {
                sort_date: Some(SortOrder::Descending),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![second, first, third]);
    }

    #[test]
    fn query_filters_by_min_date() {
        let conn = get_test_connection();
        let build = |date| Transaction::build("a", Decimal::ONE, date, TransactionType::Expense);
        create_transaction(build(date!(2025 - 09 - 30)), &conn).unwrap();
        let on_boundary = create_transaction(build(date!(2025 - 10 - 01)), &conn).unwrap();
        let after = create_transaction(build(date!(2025 - 10 - 02)), &conn).unwrap();

        let got = query_transactions(
            &TransactionQuery {
                min_date: Some(date!(2025 - 10 - 01)),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![on_boundary, after]);
    }

    #[test]
    fn query_recurring_only() {
        let conn = get_test_connection();
        let build = |recurring| {
            Transaction::build(
                "a",
                Decimal::ONE,
                date!(2025 - 10 - 01),
                TransactionType::Income,
            )
            .recurring(recurring)
        };
        create_transaction(build(Recurrence::No), &conn).unwrap();
        let monthly = create_transaction(build(Recurrence::Monthly), &conn).unwrap();
        let daily = create_transaction(build(Recurrence::Daily), &conn).unwrap();

        let got = query_transactions(
            &TransactionQuery {
                recurring_only: true,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![monthly, daily]);
    }

    #[test]
    fn update_replaces_all_fields() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(
                "Wages",
                Decimal::new(1000, 0),
                date!(2025 - 10 - 01),
                TransactionType::Income,
            ),
            &conn,
        )
        .unwrap();
        let replacement = Transaction::build(
            "Rent",
            Decimal::new(-450, 0),
            date!(2025 - 10 - 02),
            TransactionType::Expense,
        )
        .recurring(Recurrence::Weekly);

        let updated = update_transaction(created.id, replacement, &conn).unwrap();

        let want = Transaction {
            id: created.id,
            category: "Rent".to_owned(),
            amount: Decimal::new(-450, 0),
            date: date!(2025 - 10 - 02),
            kind: TransactionType::Expense,
            recurring: Recurrence::Weekly,
        };
        assert_eq!(updated, want);
        assert_eq!(get_transaction(created.id, &conn), Ok(want));
    }

    #[test]
    fn update_missing_transaction_is_not_found() {
        let conn = get_test_connection();

        let result = update_transaction(
            TransactionId::generate(),
            Transaction::build(
                "Rent",
                Decimal::ONE,
                date!(2025 - 10 - 02),
                TransactionType::Expense,
            ),
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(
                "Rent",
                Decimal::ONE,
                date!(2025 - 10 - 02),
                TransactionType::Expense,
            ),
            &conn,
        )
        .unwrap();

        delete_transaction(created.id, &conn).unwrap();

        assert_eq!(get_transaction(created.id, &conn), Err(Error::NotFound));
        assert_eq!(delete_transaction(created.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let today = date!(2025 - 10 - 05);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build("a", Decimal::from(i), today, TransactionType::Expense),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn table_rejects_invalid_enum_text() {
        let conn = get_test_connection();

        let result = conn.execute(
            "INSERT INTO \"transaction\" (id, category, amount, date, type, recurring)
             VALUES ('x', 'a', '1', '2025-10-01', 'income', 'Fortnightly')",
            (),
        );

        assert!(result.is_err());
    }
}
