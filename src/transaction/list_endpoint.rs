//! Defines the endpoint for listing transactions, newest first.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    db::lock_connection,
    filters::{DaysQuery, lookback_start},
    timezone::local_today,
    transaction::{SortOrder, Transaction, TransactionQuery, query_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for listing transactions from the last `days` days.
///
/// Leaving out `days`, or passing zero or less, lists every transaction.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let Query(query) = query?;
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(today, query.days, &connection).map(Json)
}

fn list_transactions(
    today: Date,
    days: Option<i64>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions(
        &TransactionQuery {
            min_date: lookback_start(today, days),
            sort_date: Some(SortOrder::Descending),
            ..Default::default()
        },
        connection,
    )
}
