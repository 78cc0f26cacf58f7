//! Route handlers for the totals and category summaries.

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
    summary::aggregation::{CategorySummary, Totals, category_summary, totals},
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, query_transactions},
};

/// The state needed for the summary routes.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for income and expense totals over the last `days` days.
///
/// Leaving out `days`, or passing zero or less, totals every transaction.
pub async fn get_totals_endpoint(
    State(state): State<SummaryState>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> Result<Json<Totals>, Error> {
    let Query(query) = query?;
    let transactions = load_window(&state, query.days)?;

    totals(&transactions).map(Json)
}

/// A route handler for per-category totals over the last `days` days.
///
/// Leaving out `days`, or passing zero or less, summarises every transaction.
pub async fn get_categories_summary_endpoint(
    State(state): State<SummaryState>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> Result<Json<CategorySummary>, Error> {
    let Query(query) = query?;
    let transactions = load_window(&state, query.days)?;

    category_summary(&transactions).map(Json)
}

fn load_window(state: &SummaryState, days: Option<i64>) -> Result<Vec<Transaction>, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    transactions_since(lookback_start(today, days), &connection)
}

/// Transactions on or after `min_date`, in creation order.
fn transactions_since(
    min_date: Option<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions(
        &TransactionQuery {
            min_date,
            ..Default::default()
        },
        connection,
    )
}
