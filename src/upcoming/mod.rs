//! Upcoming occurrences of recurring transactions.

mod endpoint;
mod projection;

pub use endpoint::get_upcoming_transactions_endpoint;
pub use projection::{ProjectedTransaction, UpcomingWindow, upcoming_transactions};
