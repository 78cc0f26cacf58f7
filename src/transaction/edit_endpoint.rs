use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{
        Transaction, TransactionBuilder, core::update_transaction, transaction_id_from_path,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that replaces every field of a transaction, responds with
/// the updated transaction.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<TransactionBuilder>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let transaction_id = transaction_id_from_path(path)?;
    let Json(builder) = payload?;
    let builder = builder.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    match update_transaction(transaction_id, builder, &connection) {
        Ok(transaction) => Ok(Json(transaction)),
        Err(Error::NotFound) => {
            tracing::debug!("Could not update transaction {transaction_id}: not found");
            Err(Error::NotFound)
        }
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            Err(error)
        }
    }
}
