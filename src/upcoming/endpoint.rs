use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    filters::DaysQuery,
    timezone::local_today,
    transaction::{Transaction, TransactionQuery, query_transactions},
    upcoming::projection::{ProjectedTransaction, UpcomingWindow, upcoming_transactions},
};

/// The state needed to project upcoming transactions.
#[derive(Debug, Clone)]
pub struct UpcomingState {
    /// The database connection for reading recurring transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for UpcomingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for the occurrences of recurring transactions over the
/// next `days` days, starting today.
///
/// `days` defaults to 30. Zero or less projects about two years ahead, and
/// windows longer than about ten years are rejected.
pub async fn get_upcoming_transactions_endpoint(
    State(state): State<UpcomingState>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> Result<Json<Vec<ProjectedTransaction>>, Error> {
    let Query(query) = query?;
    let today = local_today(&state.local_timezone)?;
    let window = UpcomingWindow::from_days(today, query.days)?;

    let recurring = {
        let connection = lock_connection(&state.db_connection)?;
        recurring_transactions(&connection)?
    };

    Ok(Json(upcoming_transactions(&recurring, window)))
}

/// Every recurring transaction, in creation order.
fn recurring_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    query_transactions(
        &TransactionQuery {
            recurring_only: true,
            ..Default::default()
        },
        connection,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::{Date, Duration, OffsetDateTime, macros::date};

    use crate::{
        Error, TransactionBuilder,
        db::initialize,
        filters::DaysQuery,
        recurrence::Recurrence,
        transaction::{Transaction, TransactionType, create_transaction},
        upcoming::{
            endpoint::{UpcomingState, get_upcoming_transactions_endpoint, recurring_transactions},
            projection::{MAX_UPCOMING_DAYS, ProjectedTransaction, UpcomingWindow},
            upcoming_transactions,
        },
    };

    fn build(date: Date, recurring: Recurrence) -> TransactionBuilder {
        Transaction::build("Bills", Decimal::new(4999, 2), date, TransactionType::Expense)
            .recurring(recurring)
    }

    fn upcoming(today: Date, days: i64, connection: &Connection) -> Vec<ProjectedTransaction> {
        let window = UpcomingWindow::from_days(today, Some(days)).unwrap();

        upcoming_transactions(&recurring_transactions(connection).unwrap(), window)
    }

    fn get_test_state(connection: Connection) -> UpcomingState {
        UpcomingState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[test]
    fn only_recurring_transactions_are_projected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let today = date!(2025 - 10 - 16);
        create_transaction(build(today, Recurrence::No), &conn).unwrap();
        let weekly =
            create_transaction(build(date!(2025 - 10 - 13), Recurrence::Weekly), &conn).unwrap();

        let got = upcoming(today, 14, &conn);

        let dates: Vec<_> = got.iter().map(|occurrence| occurrence.date).collect();
        assert_eq!(dates, [date!(2025 - 10 - 20), date!(2025 - 10 - 27)]);
        assert!(got.iter().all(|occurrence| occurrence.source_id == weekly.id));
    }

    #[test]
    fn ties_keep_creation_order() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let today = date!(2025 - 10 - 16);
        let first = create_transaction(build(today, Recurrence::Monthly), &conn).unwrap();
        let second = create_transaction(build(today, Recurrence::Daily), &conn).unwrap();

        let got = upcoming(today, 1, &conn);

        let sources: Vec<_> = got.iter().map(|occurrence| occurrence.source_id).collect();
        assert_eq!(sources, [first.id, second.id, second.id]);
    }

    #[tokio::test]
    async fn default_window_is_thirty_days() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let today = OffsetDateTime::now_utc().date();
        create_transaction(build(today - Duration::days(3), Recurrence::Daily), &conn).unwrap();
        let state = get_test_state(conn);

        let got = get_upcoming_transactions_endpoint(State(state), Ok(Query(DaysQuery::default())))
            .await
            .unwrap();

        assert_eq!(got.0.len(), 31);
        assert_eq!(got.0[0].date, today);
    }

    #[tokio::test]
    async fn window_over_maximum_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let today = OffsetDateTime::now_utc().date();
        create_transaction(build(today, Recurrence::Daily), &conn).unwrap();
        let state = get_test_state(conn);

        let widest = get_upcoming_transactions_endpoint(
            State(state.clone()),
            Ok(Query(DaysQuery {
                days: Some(MAX_UPCOMING_DAYS),
            })),
        )
        .await
        .unwrap();
        let too_wide = get_upcoming_transactions_endpoint(
            State(state.clone()),
            Ok(Query(DaysQuery {
                days: Some(i64::MAX),
            })),
        )
        .await;

        assert_eq!(widest.0.len(), MAX_UPCOMING_DAYS as usize + 1);
        assert!(matches!(too_wide, Err(Error::Validation(_))));
    }
}
