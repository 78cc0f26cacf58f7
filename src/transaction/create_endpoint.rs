//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    transaction::{TransactionBuilder, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 Created, the stored transaction as JSON and its URI in
/// the `Location` header.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    payload: Result<Json<TransactionBuilder>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(builder) = payload?;
    let builder = builder.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(builder, &connection).inspect_err(|error| {
        tracing::error!("could not create transaction: {error}");
    })?;

    tracing::debug!("created transaction {}", transaction.id);
    let location = format_endpoint(endpoints::TRANSACTION, transaction.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(transaction)).into_response())
}
