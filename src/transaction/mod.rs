//! Transaction management for the finance tracker.
//!
//! This module contains everything related to stored transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Route handlers for the transaction CRUD endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;

use axum::extract::{Path, rejection::PathRejection};

pub use self::core::{
    SortOrder, Transaction, TransactionBuilder, TransactionQuery, TransactionType,
    count_transactions, create_transaction, create_transaction_table, query_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub use self::core::{delete_transaction, get_transaction, update_transaction};

use crate::{Error, database_id::TransactionId};

/// Extract the transaction ID from the request path.
///
/// A path segment that is not a valid ID cannot name a stored transaction, so
/// it is reported as [Error::NotFound].
fn transaction_id_from_path(
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<TransactionId, Error> {
    path.map(|Path(transaction_id)| transaction_id)
        .map_err(|rejection| {
            tracing::debug!("invalid transaction ID in path: {}", rejection.body_text());
            Error::NotFound
        })
}
