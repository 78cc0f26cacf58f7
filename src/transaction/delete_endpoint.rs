use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{core::delete_transaction, transaction_id_from_path},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The confirmation sent after a transaction is deleted.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DeletedTransaction {
    /// The ID of the transaction that was deleted.
    pub deleted: TransactionId,
}

/// A route handler for deleting a transaction, responds with a confirmation
/// or 404 if there is no such transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<DeletedTransaction>, Error> {
    let transaction_id = transaction_id_from_path(path)?;
    let connection = lock_connection(&state.db_connection)?;

    match delete_transaction(transaction_id, &connection) {
        Ok(()) => Ok(Json(DeletedTransaction {
            deleted: transaction_id,
        })),
        Err(Error::NotFound) => Err(Error::NotFound),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            Err(error)
        }
    }
}
