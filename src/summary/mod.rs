//! Income and expense summaries over a window of stored transactions.

mod aggregation;
mod handlers;

pub use aggregation::{CategorySummary, CategoryTotal, Totals, category_summary, totals};
pub use handlers::{get_categories_summary_endpoint, get_totals_endpoint};
